use std::collections::HashMap;

use rand::RngCore;
use tracing::debug;

use super::MacroError;
use super::builtins::{Builtin, registry};
use super::scanner::{Scanner, split_args, unescape};
use crate::macros::MacroTable;

/// Upper bound on directive expansions for one text.
pub const DEFAULT_MAX_STEPS: usize = 100_000;

/// Variables and metadata visible to one render call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderState {
    /// Values stored by `SAVE`/`VAR`.
    pub vars: HashMap<String, String>,
    /// The current question's fields plus `COUNTER` and `FILE`.
    pub metadata: HashMap<String, String>,
}

impl RenderState {
    #[must_use]
    pub fn with_metadata(metadata: HashMap<String, String>) -> Self {
        Self { vars: HashMap::new(), metadata }
    }
}

/// A built-in call in progress.
pub struct Invocation<'a> {
    engine: &'a Engine,
    pub state: &'a mut RenderState,
    pub rng: &'a mut dyn RngCore,
}

impl Invocation<'_> {
    /// Resolve `name(args)` through the full lookup chain.
    pub fn call(&mut self, name: &str, args: &[String]) -> Result<String, MacroError> {
        self.engine.dispatch(name, args, self.state, self.rng)
    }
}

/// Expands directives with a fixed macro table and built-in set.
pub struct Engine {
    macros: MacroTable,
    builtins: HashMap<&'static str, Builtin>,
    max_steps: usize,
}

impl Engine {
    #[must_use]
    pub fn new(macros: MacroTable) -> Self {
        Self { macros, builtins: registry(), max_steps: DEFAULT_MAX_STEPS }
    }

    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Resolve one operator: metadata, then variables, then user macros,
    /// then built-ins.
    pub fn dispatch(
        &self,
        name: &str,
        args: &[String],
        state: &mut RenderState,
        rng: &mut dyn RngCore,
    ) -> Result<String, MacroError> {
        if let Some(value) = state.metadata.get(name) {
            return Ok(value.clone());
        }
        if let Some(value) = state.vars.get(name) {
            return Ok(value.clone());
        }
        if let Some(def) = self.macros.get(name) {
            return Ok(def.apply(args)?);
        }
        if let Some(builtin) = self.builtins.get(name) {
            let mut call = Invocation { engine: self, state, rng };
            return builtin(&mut call, args);
        }
        Err(MacroError::Unknown(name.to_string()))
    }

    /// Expand every directive of `text`, innermost first, then unescape.
    pub fn expand(
        &self,
        text: &str,
        state: &mut RenderState,
        rng: &mut dyn RngCore,
    ) -> Result<String, MacroError> {
        let mut current = text.to_string();
        let mut scanner = Scanner::default();

        for _ in 0..self.max_steps {
            let Some(span) = scanner.next_directive(&current)? else {
                return Ok(unescape(&current));
            };

            let args = split_args(span.body(&current));
            let (name, rest) = args.split_first().map_or(("", &[][..]), |(n, r)| (n.as_str(), r));

            let (end, replacement) = if name == "DNL" {
                let end = current[span.end..].find('\n').map_or(current.len(), |pos| span.end + pos + 1);
                (end, String::new())
            } else {
                let result = self.dispatch(name, rest, state, rng)?;
                debug!(directive = span.body(&current), result = %result, "directive expanded");
                (span.end, result)
            };
            current.replace_range(span.start..end, &replacement);
        }

        Err(MacroError::ExpansionLimit(self.max_steps))
    }

    /// Expand one text per channel with a shared state.
    ///
    /// Before each channel, `FILE` is set to the channel id and the channel's
    /// previous metadata value (the question's raw text) is kept as
    /// `<id>_raw`. After expanding, the result replaces `metadata[id]`, so
    /// later channels can refer to what earlier ones produced.
    pub fn render(
        &self,
        counter: usize,
        base: &RenderState,
        channels: &[String],
        texts: &[String],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<String>, MacroError> {
        let mut state = base.clone();
        state.metadata.insert("COUNTER".into(), counter.to_string());

        let mut outputs = Vec::with_capacity(channels.len());
        for (id, text) in channels.iter().zip(texts) {
            state.metadata.insert("FILE".into(), id.clone());
            if let Some(raw) = state.metadata.get(id).cloned() {
                state.metadata.insert(format!("{id}_raw"), raw);
            }
            let expanded = self.expand(text, &mut state, rng)?;
            state.metadata.insert(id.clone(), expanded.clone());
            outputs.push(expanded);
        }
        Ok(outputs)
    }
}
