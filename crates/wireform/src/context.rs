//! Per-call cursor state.
//!
//! A context is owned exclusively by the decode or encode call that created
//! it and discarded at call end. [`ReadContext`] carries the character
//! source, the active options, the stack of open structural tokens, and the
//! one-slot pending-token queue; [`WriteContext`] carries the sink, options,
//! and the indentation depth counter.

use crate::{
    error::ParseError,
    options::Options,
    scan::scan_literal,
    sink::Sink,
    source::Source,
    syntax::Syntax,
    token::Token,
};

/// One currently-open structural token.
#[derive(Debug, Clone, Copy)]
pub struct Open {
    pub token: Token,
    /// In an object: whether the next value-bearing token is a key.
    pub expect_key: bool,
    /// Column of the structure's entries; meaningful for block layouts.
    pub indent: usize,
    /// Whether the structure uses bracketed (flow) syntax.
    pub flow: bool,
}

/// Mutable state of one decode call.
pub struct ReadContext<'a> {
    pub source: Source<'a>,
    pub options: Options,
    open: Vec<Open>,
    pending: Option<Token>,
    pending_literal: Option<String>,
    staged: Option<(usize, bool)>,
}

impl<'a> ReadContext<'a> {
    #[must_use]
    pub fn new(source: Source<'a>, options: Options) -> Self {
        Self {
            source,
            options,
            open: Vec::with_capacity(8),
            pending: None,
            pending_literal: None,
            staged: None,
        }
    }

    /// Produces the next token: drains the pending queue if occupied,
    /// otherwise asks the format for a fresh classification. Stack effects
    /// (push on open, pop on close, key bookkeeping) are applied here so
    /// pending and fresh tokens behave identically.
    pub fn fetch_token<S: Syntax + ?Sized>(
        &mut self,
        syntax: &S,
    ) -> Result<Token, ParseError> {
        let token = match self.pending.take() {
            Some(token) => token,
            None => syntax.next_token(self)?,
        };
        self.apply(token);
        Ok(token)
    }

    /// Harvests the literal for the most recent value-bearing token. A
    /// closing `}`/`]` consumed by the scan lands in the pending queue.
    pub fn read_literal(&mut self) -> Result<String, ParseError> {
        if let Some(text) = self.pending_literal.take() {
            return Ok(text);
        }
        let scanned = scan_literal(&mut self.source)?;
        if let Some(token) = scanned.pending {
            self.queue(token);
        }
        // An entry separator consumed as the scan terminator still counts.
        if self.source.current() == Some(',') {
            self.mark_key_expected();
        }
        Ok(scanned.text)
    }

    /// Innermost open structural token.
    #[must_use]
    pub fn innermost(&self) -> Option<&Open> {
        self.open.last()
    }

    #[must_use]
    pub fn open_depth(&self) -> usize {
        self.open.len()
    }

    /// Whether the next value-bearing token in the innermost structure is
    /// an object key.
    #[must_use]
    pub fn expecting_key(&self) -> bool {
        self.open
            .last()
            .is_some_and(|o| o.token == Token::Object && o.expect_key)
    }

    /// Marks the innermost object as expecting a key again; called by the
    /// lexers after an entry separator or a completed block value.
    pub fn mark_key_expected(&mut self) {
        if let Some(open) = self.open.last_mut() {
            if open.token == Token::Object {
                open.expect_key = true;
            }
        }
    }

    /// Declares the indent/flow shape of the structure the next
    /// `Object`/`Array` token will open.
    pub fn stage_open(&mut self, indent: usize, flow: bool) {
        self.staged = Some((indent, flow));
    }

    /// Queues a token to be returned by the next fetch. The queue holds at
    /// most one token.
    pub fn queue(&mut self, token: Token) {
        debug_assert!(self.pending.is_none(), "pending-token queue overrun");
        self.pending = Some(token);
    }

    /// Hands a pre-scanned literal to the next `read_literal` call; used by
    /// lexers that must scan ahead to classify.
    pub fn queue_literal(&mut self, text: String) {
        debug_assert!(self.pending_literal.is_none(), "pending literal overrun");
        self.pending_literal = Some(text);
    }

    fn apply(&mut self, token: Token) {
        match token {
            Token::Object | Token::Array => {
                let (indent, flow) = self.staged.take().unwrap_or((0, true));
                self.open.push(Open {
                    token,
                    expect_key: token == Token::Object,
                    indent,
                    flow,
                });
            }
            Token::ObjectEnd | Token::ArrayEnd => {
                self.open.pop();
                // A closed structure completes the pending entry of an
                // enclosing block mapping.
                if let Some(parent) = self.open.last_mut() {
                    if !parent.flow && parent.token == Token::Object {
                        parent.expect_key = true;
                    }
                }
            }
            Token::Property => {
                if let Some(open) = self.open.last_mut() {
                    open.expect_key = false;
                }
            }
            _ => {}
        }
    }
}

/// Mutable state of one encode call.
pub struct WriteContext {
    pub sink: Sink,
    pub options: Options,
    depth: usize,
    /// Per open structure: whether no entry has been written yet.
    empties: Vec<bool>,
}

impl WriteContext {
    #[must_use]
    pub fn new(options: Options) -> Self {
        Self {
            sink: Sink::new(),
            options,
            depth: 0,
            empties: Vec::with_capacity(8),
        }
    }

    #[must_use]
    pub fn pretty(&self) -> bool {
        self.options.contains(Options::PRETTY)
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Enters a structure: one more indentation level.
    pub fn enter(&mut self) {
        self.depth += 1;
        self.empties.push(true);
    }

    /// Leaves a structure, reporting whether it stayed empty.
    pub fn exit(&mut self) -> bool {
        self.depth = self.depth.saturating_sub(1);
        self.empties.pop().unwrap_or(true)
    }

    /// Records that the current structure received an entry.
    pub fn mark_item(&mut self) {
        if let Some(empty) = self.empties.last_mut() {
            *empty = false;
        }
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.sink.into_string()
    }
}
