//! The generic token-driven deserialization engine.
//!
//! Drives a loop over the tokens produced by the active format adapter and
//! dispatches on (token, declared target type). Values are built into fresh
//! local structures only; the first error aborts the call and nothing
//! partially populated escapes.

use crate::{
    Codec,
    context::ReadContext,
    error::{Error, ParseError, SchemaError},
    model::ValueType,
    options::Options,
    source::Source,
    syntax::Syntax,
    token::Token,
    value::{Fields, Value},
};

impl<S: Syntax> Codec<'_, S> {
    /// Decodes `text` into a value of the declared target type.
    pub fn decode(
        &self,
        text: &str,
        target: &ValueType,
        options: Options,
    ) -> Result<Value, Error> {
        self.decode_source(Source::of_str(text), target, options)
    }

    /// Decodes from a blocking reader; the stream length is unknown and
    /// end-of-input is the sole termination signal.
    pub fn decode_from(
        &self,
        reader: impl std::io::Read,
        target: &ValueType,
        options: Options,
    ) -> Result<Value, Error> {
        self.decode_source(Source::from_reader(reader), target, options)
    }

    fn decode_source(
        &self,
        source: Source<'_>,
        target: &ValueType,
        options: Options,
    ) -> Result<Value, Error> {
        tracing::trace!(kind = target.kind(), "decoding document");
        let mut cx = ReadContext::new(source, options);
        let token = cx.fetch_token(&self.syntax)?;
        let value = self.decode_token(&mut cx, token, target)?;
        let end = cx.fetch_token(&self.syntax)?;
        if end != Token::End {
            return Err(ParseError::UnexpectedToken {
                token: end,
                position: cx.source.position(),
            }
            .into());
        }
        debug_assert_eq!(cx.open_depth(), 0, "open-token stack not drained at end");
        Ok(value)
    }

    fn decode_token(
        &self,
        cx: &mut ReadContext<'_>,
        token: Token,
        target: &ValueType,
    ) -> Result<Value, Error> {
        match token {
            Token::Object => self.decode_object(cx, target),
            Token::Array => self.decode_sequence(cx, target),
            Token::Str | Token::Number | Token::Boolean => {
                self.decode_scalar(cx, token, target)
            }
            Token::Null => Ok(Value::Null),
            Token::Property | Token::ObjectEnd | Token::ArrayEnd | Token::End => {
                Err(ParseError::UnexpectedToken {
                    token,
                    position: cx.source.position(),
                }
                .into())
            }
        }
    }

    fn decode_object(
        &self,
        cx: &mut ReadContext<'_>,
        target: &ValueType,
    ) -> Result<Value, Error> {
        match target {
            ValueType::Object(name) => {
                if let Some(property) = self.types.property_of(name) {
                    return self.decode_polymorphic(cx, name, property);
                }
                self.decode_typed_object(cx, name)
            }
            ValueType::Map(value_type) => {
                Ok(Value::Object(self.decode_entries(cx, value_type)?))
            }
            ValueType::Any => {
                Ok(Value::Object(self.decode_entries(cx, &ValueType::Any)?))
            }
            other => Err(SchemaError::Mismatch {
                expected: other.kind(),
                found: "object".into(),
            }
            .into()),
        }
    }

    /// Populates a named aggregate field by field against its table.
    fn decode_typed_object(
        &self,
        cx: &mut ReadContext<'_>,
        name: &str,
    ) -> Result<Value, Error> {
        let specs = self
            .model
            .fields_of(name)
            .ok_or_else(|| SchemaError::UnknownType(name.to_string()))?;
        let mut out = Fields::typed(name);
        loop {
            cx.mark_key_expected();
            let token = cx.fetch_token(&self.syntax)?;
            match token {
                Token::ObjectEnd => break,
                Token::Property => {
                    let key = cx.read_literal()?;
                    match specs.iter().find(|s| s.wire_name == key) {
                        Some(spec) if spec.readable => {
                            let token = cx.fetch_token(&self.syntax)?;
                            let value = self.decode_token(cx, token, &spec.value_type)?;
                            out.insert(key, value);
                        }
                        Some(_) => self.skip_value(cx)?,
                        None if cx.options.contains(Options::IGNORE_UNKNOWN_PROPERTIES) => {
                            tracing::debug!(
                                type_name = name,
                                property = %key,
                                "ignoring unknown property"
                            );
                            self.skip_value(cx)?;
                        }
                        None => {
                            return Err(SchemaError::UnknownProperty {
                                type_name: name.to_string(),
                                property: key,
                            }
                            .into());
                        }
                    }
                }
                token => {
                    return Err(ParseError::UnexpectedToken {
                        token,
                        position: cx.source.position(),
                    }
                    .into());
                }
            }
        }
        Ok(Value::Object(out))
    }

    /// Reads `(property, value)` pairs in encounter order, decoding every
    /// value against one declared type.
    fn decode_entries(
        &self,
        cx: &mut ReadContext<'_>,
        value_type: &ValueType,
    ) -> Result<Fields, Error> {
        let mut out = Fields::new();
        loop {
            cx.mark_key_expected();
            let token = cx.fetch_token(&self.syntax)?;
            match token {
                Token::ObjectEnd => break,
                Token::Property => {
                    let key = cx.read_literal()?;
                    let token = cx.fetch_token(&self.syntax)?;
                    let value = self.decode_token(cx, token, value_type)?;
                    out.insert(key, value);
                }
                token => {
                    return Err(ParseError::UnexpectedToken {
                        token,
                        position: cx.source.position(),
                    }
                    .into());
                }
            }
        }
        Ok(out)
    }

    /// Buffers the whole object, resolves the discriminator through the
    /// type registry, then re-drives population against the concrete field
    /// table. Buffering tolerates the discriminator appearing anywhere in
    /// the source object.
    fn decode_polymorphic(
        &self,
        cx: &mut ReadContext<'_>,
        base: &str,
        property: String,
    ) -> Result<Value, Error> {
        let buffered = self.decode_entries(cx, &ValueType::Any)?;
        self.assign_object(cx.options, &buffered, base, Some(property))
    }

    fn decode_sequence(
        &self,
        cx: &mut ReadContext<'_>,
        target: &ValueType,
    ) -> Result<Value, Error> {
        let (element, dedup) = match target {
            ValueType::List(el) | ValueType::Array(el) => ((**el).clone(), false),
            ValueType::Set(el) => ((**el).clone(), true),
            ValueType::Any => (ValueType::Any, false),
            other => {
                return Err(SchemaError::Mismatch {
                    expected: other.kind(),
                    found: "sequence".into(),
                }
                .into());
            }
        };
        let mut items = Vec::new();
        loop {
            let token = cx.fetch_token(&self.syntax)?;
            if token == Token::ArrayEnd {
                break;
            }
            let value = self.decode_token(cx, token, &element)?;
            if !dedup || !items.contains(&value) {
                items.push(value);
            }
        }
        Ok(Value::Sequence(items))
    }

    fn decode_scalar(
        &self,
        cx: &mut ReadContext<'_>,
        token: Token,
        target: &ValueType,
    ) -> Result<Value, Error> {
        let literal = cx.read_literal()?;
        if cx.options.contains(Options::UNWRAP_STRINGS)
            && token == Token::Str
            && !matches!(target, ValueType::String | ValueType::Any)
        {
            // A quoted literal that is itself a parseable document for the
            // target re-enters the engine instead of coercing directly.
            if let Ok(nested) = self.decode(&literal, target, cx.options) {
                return Ok(nested);
            }
        }
        Ok(self.coerce_literal(token, literal, target)?)
    }

    fn coerce_literal(
        &self,
        token: Token,
        literal: String,
        target: &ValueType,
    ) -> Result<Value, SchemaError> {
        match target {
            ValueType::Any => match token {
                Token::Str => Ok(Value::String(literal)),
                Token::Boolean => parse_bool(&literal).map(Value::Boolean),
                _ => parse_number(&literal),
            },
            ValueType::String if token == Token::Str => Ok(Value::String(literal)),
            ValueType::Integer if token == Token::Number => literal
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| SchemaError::InvalidLiteral {
                    kind: "integer",
                    literal,
                }),
            ValueType::Float if token == Token::Number => literal
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| SchemaError::InvalidLiteral {
                    kind: "float",
                    literal,
                }),
            ValueType::Boolean if token == Token::Boolean => {
                parse_bool(&literal).map(Value::Boolean)
            }
            // A named type registered to travel as this scalar token keeps
            // the raw literal; the consumer interprets it.
            target if self.defaults.token_for(target) == token => {
                Ok(Value::String(literal))
            }
            target => Err(SchemaError::Mismatch {
                expected: target.kind(),
                found: token.to_string(),
            }),
        }
    }

    /// Parses and discards one value.
    fn skip_value(&self, cx: &mut ReadContext<'_>) -> Result<(), Error> {
        let token = cx.fetch_token(&self.syntax)?;
        self.decode_token(cx, token, &ValueType::Any)?;
        Ok(())
    }

    /// Re-drives normal object population from a buffered property map.
    /// `discriminator` names the property consumed by resolution; it is
    /// tolerated without a matching field.
    pub(crate) fn assign_object(
        &self,
        options: Options,
        entries: &Fields,
        type_name: &str,
        discriminator: Option<String>,
    ) -> Result<Value, Error> {
        let (concrete, discriminator) = match discriminator {
            Some(property) => {
                let Some(value) = entries.get(&property) else {
                    return Err(SchemaError::UnknownTypeProperty {
                        base: type_name.to_string(),
                        property,
                    }
                    .into());
                };
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                let concrete = self.types.resolve(type_name, &property, &value)?;
                tracing::debug!(base = type_name, concrete = %concrete, "resolved subtype");
                (concrete, Some(property))
            }
            None => (type_name.to_string(), None),
        };

        let specs = self
            .model
            .fields_of(&concrete)
            .ok_or_else(|| SchemaError::UnknownType(concrete.clone()))?;
        let mut out = Fields::typed(concrete.clone());
        for (key, value) in entries.iter() {
            match specs.iter().find(|s| s.wire_name == key) {
                Some(spec) if spec.readable => {
                    let value = self.coerce_value(options, value, &spec.value_type)?;
                    out.insert(key, value);
                }
                Some(_) => {}
                None if discriminator.as_deref() == Some(key) => {}
                None if options.contains(Options::IGNORE_UNKNOWN_PROPERTIES) => {
                    tracing::debug!(type_name = %concrete, property = key, "ignoring unknown property");
                }
                None => {
                    return Err(SchemaError::UnknownProperty {
                        type_name: concrete,
                        property: key.to_string(),
                    }
                    .into());
                }
            }
        }
        Ok(Value::Object(out))
    }

    /// Structural coercion of an already-built value onto a declared type;
    /// the value side of buffered polymorphic population.
    fn coerce_value(
        &self,
        options: Options,
        value: &Value,
        target: &ValueType,
    ) -> Result<Value, Error> {
        match (value, target) {
            (v, ValueType::Any) => Ok(v.clone()),
            (Value::Null, _) => Ok(Value::Null),
            (Value::String(_), ValueType::String) => Ok(value.clone()),
            (Value::Integer(_), ValueType::Integer) => Ok(value.clone()),
            #[allow(clippy::cast_precision_loss)]
            (Value::Integer(n), ValueType::Float) => Ok(Value::Float(*n as f64)),
            (Value::Float(_), ValueType::Float) => Ok(value.clone()),
            (Value::Boolean(_), ValueType::Boolean) => Ok(value.clone()),
            (Value::String(_), target @ ValueType::Object(_))
                if self.defaults.token_for(target) == Token::Str =>
            {
                Ok(value.clone())
            }
            (Value::String(s), target)
                if options.contains(Options::UNWRAP_STRINGS) =>
            {
                self.decode(s, target, options)
            }
            (Value::Sequence(items), ValueType::List(el) | ValueType::Array(el)) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.coerce_value(options, item, el)?);
                }
                Ok(Value::Sequence(out))
            }
            (Value::Sequence(items), ValueType::Set(el)) => {
                let mut out = Vec::new();
                for item in items {
                    let item = self.coerce_value(options, item, el)?;
                    if !out.contains(&item) {
                        out.push(item);
                    }
                }
                Ok(Value::Sequence(out))
            }
            (Value::Object(fields), ValueType::Map(value_type)) => {
                let mut out = Fields::new();
                for (key, item) in fields.iter() {
                    out.insert(key, self.coerce_value(options, item, value_type)?);
                }
                Ok(Value::Object(out))
            }
            (Value::Object(fields), ValueType::Object(name)) => {
                self.assign_object(options, fields, name, self.types.property_of(name))
            }
            (v, t) => Err(SchemaError::Mismatch {
                expected: t.kind(),
                found: v.kind().to_string(),
            }
            .into()),
        }
    }
}

fn parse_bool(literal: &str) -> Result<bool, SchemaError> {
    match literal {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(SchemaError::InvalidLiteral {
            kind: "boolean",
            literal: literal.to_string(),
        }),
    }
}

fn parse_number(literal: &str) -> Result<Value, SchemaError> {
    if !literal.contains(['.', 'e', 'E']) {
        if let Ok(n) = literal.parse::<i64>() {
            return Ok(Value::Integer(n));
        }
    }
    literal
        .parse::<f64>()
        .map(Value::Float)
        .map_err(|_| SchemaError::InvalidLiteral {
            kind: "number",
            literal: literal.to_string(),
        })
}
