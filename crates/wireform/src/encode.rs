//! The generic type-driven serialization engine.
//!
//! For every value: a registered custom writer wins, then a typed object
//! walks its field table in declared order, and everything else renders
//! structurally. All structural emission is delegated to the active format
//! adapter; the engine only sequences it.

use crate::{
    Codec,
    context::WriteContext,
    error::Error,
    model::FieldSpec,
    options::Options,
    syntax::Syntax,
    value::{Fields, Value},
};

impl<S: Syntax> Codec<'_, S> {
    /// Encodes a value into wire text.
    pub fn encode(&self, value: &Value, options: Options) -> Result<String, Error> {
        tracing::trace!(kind = value.kind(), "encoding document");
        let mut wx = WriteContext::new(options);
        self.encode_value(&mut wx, value)?;
        Ok(wx.into_string())
    }

    fn encode_value(&self, wx: &mut WriteContext, value: &Value) -> Result<(), Error> {
        match value {
            Value::Null => self.syntax.write_null(wx),
            Value::Boolean(b) => self.syntax.write_bool(wx, *b),
            Value::Integer(n) => self.syntax.write_integer(wx, *n),
            Value::Float(n) => self.syntax.write_float(wx, *n),
            Value::String(s) => self.syntax.write_string(wx, s),
            Value::Sequence(items) => {
                self.syntax.open_array(wx);
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.syntax.separate(wx);
                    }
                    self.syntax.element(wx);
                    self.encode_value(wx, item)?;
                }
                self.syntax.close_array(wx);
            }
            Value::Object(fields) => {
                if let Some(name) = fields.type_name() {
                    if let Some(writer) = self.writers.get(name) {
                        writer(value, &mut wx.sink);
                        return Ok(());
                    }
                    if let Some(specs) = self.model.fields_of(name) {
                        return self.encode_record(wx, name, fields, &specs);
                    }
                }
                self.encode_map(wx, fields)?;
            }
        }
        Ok(())
    }

    /// Field-table walk: explicit `order` hints first (stable), declaration
    /// order otherwise; unwritable fields, never-assigned fields, and —
    /// under `NON_DEFAULT` — fields equal to the default instance's value
    /// are skipped.
    fn encode_record(
        &self,
        wx: &mut WriteContext,
        name: &str,
        fields: &Fields,
        specs: &[FieldSpec],
    ) -> Result<(), Error> {
        let mut order: Vec<usize> = (0..specs.len()).collect();
        order.sort_by_key(|&i| (specs[i].order.unwrap_or(i32::MAX), i));

        let default = wx
            .options
            .contains(Options::NON_DEFAULT)
            .then(|| self.model.default_instance_of(name))
            .flatten();

        self.syntax.open_object(wx);
        let mut first = true;
        for &i in &order {
            let spec = &specs[i];
            if !spec.writable {
                continue;
            }
            let Some(value) = fields.get(&spec.wire_name) else {
                continue;
            };
            if let Some(default) = &default {
                let field_default = default
                    .as_object()
                    .and_then(|d| d.get(&spec.wire_name));
                let is_default = match field_default {
                    Some(d) => d == value,
                    None => value.is_null(),
                };
                if is_default {
                    continue;
                }
            }
            if !first {
                self.syntax.separate(wx);
            }
            first = false;
            self.syntax.write_key(wx, &spec.wire_name);
            self.encode_value(wx, value)?;
        }
        self.syntax.close_object(wx);
        Ok(())
    }

    /// Untyped objects and map targets render every entry in order.
    fn encode_map(&self, wx: &mut WriteContext, fields: &Fields) -> Result<(), Error> {
        self.syntax.open_object(wx);
        for (i, (key, value)) in fields.iter().enumerate() {
            if i > 0 {
                self.syntax.separate(wx);
            }
            self.syntax.write_key(wx, key);
            self.encode_value(wx, value)?;
        }
        self.syntax.close_object(wx);
        Ok(())
    }
}
