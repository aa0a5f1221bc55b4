//! Ordered handler chain around generation and merging.
//!
//! Each handler receives the shared context and a [`Next`] cursor. Calling
//! `next.run(ctx)` hands control to the following handler; code after that
//! call sees the context as left by the rest of the chain. Returning without
//! calling `next` stops the chain.

use crate::edit::{DocumentEdit, InsertionPoint};
use crate::error::Result;
use crate::merger::Merger;

pub trait Handler<C> {
    fn handle(&self, ctx: &mut C, next: Next<'_, C>) -> Result<()>;

    fn name(&self) -> &str {
        "handler"
    }
}

/// Cursor into the handler list
pub struct Next<'a, C> {
    handlers: &'a [Box<dyn Handler<C>>],
    cursor: usize,
}

impl<C> Next<'_, C> {
    /// Run the remaining handlers
    pub fn run(self, ctx: &mut C) -> Result<()> {
        let Some(handler) = self.handlers.get(self.cursor) else {
            return Ok(());
        };
        log::trace!("pipeline step {} ({})", self.cursor, handler.name());
        handler.handle(
            ctx,
            Next {
                handlers: self.handlers,
                cursor: self.cursor + 1,
            },
        )
    }

    /// Index of the handler this cursor will run next
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of handlers not yet run
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.handlers.len().saturating_sub(self.cursor)
    }
}

pub struct Pipeline<C> {
    handlers: Vec<Box<dyn Handler<C>>>,
}

impl<C> Default for Pipeline<C> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }
}

impl<C> Pipeline<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: append a handler
    #[must_use]
    pub fn with(mut self, handler: impl Handler<C> + 'static) -> Self {
        self.push(handler);
        self
    }

    pub fn push(&mut self, handler: impl Handler<C> + 'static) {
        self.handlers.push(Box::new(handler));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the chain from the first handler
    pub fn run(&self, ctx: &mut C) -> Result<()> {
        Next {
            handlers: &self.handlers,
            cursor: 0,
        }
        .run(ctx)
    }
}

/// State passed along a generate-then-merge chain
#[derive(Debug, Clone)]
pub struct GenerationContext {
    /// Block name the generated text declares
    pub name: String,
    /// Host document the edit targets
    pub document: String,
    /// Where to insert when no previous block exists
    pub insertion: InsertionPoint,
    /// Freshly generated text, filled by a generating handler
    pub generated: Option<String>,
    /// Planned edit; `None` after planning means the block is up to date
    pub edit: Option<DocumentEdit>,
}

impl GenerationContext {
    pub fn new(name: impl Into<String>, document: impl Into<String>, insertion: InsertionPoint) -> Self {
        Self {
            name: name.into(),
            document: document.into(),
            insertion,
            generated: None,
            edit: None,
        }
    }

    #[must_use]
    pub fn with_generated(mut self, generated: impl Into<String>) -> Self {
        self.generated = Some(generated.into());
        self
    }
}

/// Plans the document edit for the generated text
pub struct PlanEditHandler {
    merger: Merger,
}

impl PlanEditHandler {
    #[must_use]
    pub const fn new(merger: Merger) -> Self {
        Self { merger }
    }
}

impl Handler<GenerationContext> for PlanEditHandler {
    fn handle(&self, ctx: &mut GenerationContext, next: Next<'_, GenerationContext>) -> Result<()> {
        match ctx.generated.as_deref() {
            Some(generated) => {
                ctx.edit = self.merger.plan_edit(&ctx.document, &ctx.name, generated, ctx.insertion)?;
            }
            None => log::debug!("nothing generated for `{}`; skipping merge", ctx.name),
        }
        next.run(ctx)
    }

    fn name(&self) -> &str {
        "plan-edit"
    }
}
