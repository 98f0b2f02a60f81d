// src/lib.rs

//! garage-flow: a small asynchronous step pipeline for sequencing writes
//! that touch more than one record.
//!
//! A pipeline is an ordered list of named steps. Each step has one or more
//! async handlers and, optionally, a compensation handler. When a step fails,
//! the compensation handlers of every step that already completed are run in
//! reverse order before the error is returned to the caller. This gives
//! "undo what we already wrote" semantics without a shared transaction.
//!
//!  - Handlers receive a cloned `ContextData<T>` and signal `Continue` or `Stop`.
//!  - Optional steps without handlers are skipped.
//!  - `Flows<E>` is a type-keyed registry: one pipeline per context type.

pub mod context;
pub mod control;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::context::{Compensator, ContextData, Handler};
pub use crate::control::{PipelineControl, PipelineResult};
pub use crate::error::{FlowError, FlowResult};
pub use crate::pipeline::{Pipeline, StepDef};
pub use crate::registry::Flows;

/*
    Typical use:
    1. Define a per-request context struct `CheckoutCtx`.
    2. Build `Pipeline<CheckoutCtx, AppError>` with its step list.
    3. Attach handlers with `.on_step()` and undo logic with `.compensate_step()`.
    4. Register it once with `Flows::<AppError>::register_pipeline`.
    5. Per request: `flows.run(ContextData::new(ctx)).await`, then read results
       back out of the context.
*/
