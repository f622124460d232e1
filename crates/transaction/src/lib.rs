//! Atomic operations and transactions.
//!
//! # Mental Model
//!
//! An [`AtomicOperation`] is one reversible mutation of a context `C`. A
//! [`Transaction`] is an ordered list of operations, each optionally paired
//! with [`OperationInterceptor`]s that recompute derived state once the
//! operation has run (or been undone).
//!
//! [`Transaction::commit`] executes operations in order. If any step fails,
//! every operation that already completed is rolled back in reverse order and
//! the original error is returned unchanged.
//!
//! # Invariants
//!
//! - `rollback` restores exactly the state observed immediately before
//!   `execute`. Operations that overwrite a value capture the prior value at
//!   construction or at the top of `execute`, never inside `rollback`.
//! - Rollback is infallible. A compensating step that cannot be applied is a
//!   programming error and is reported through `tracing::error!`.
//! - Interceptors run strictly after their operation's execute or rollback
//!   and must converge to the same derived state on both paths.

mod transaction;

pub use transaction::{Committed, Transaction};

/// A reversible unit of mutation over a context `C`.
pub trait AtomicOperation<C: ?Sized> {
	/// Error raised when the forward step fails.
	type Error;

	/// Applies the mutation.
	fn execute(&mut self, ctx: &mut C) -> Result<(), Self::Error>;

	/// Restores the state that existed before [`Self::execute`] ran.
	///
	/// Only called after a successful `execute`.
	fn rollback(&mut self, ctx: &mut C);

	/// Short label used in diagnostics.
	fn name(&self) -> &'static str {
		std::any::type_name::<Self>()
	}
}

/// Derived-state hook bound to a single operation.
pub trait OperationInterceptor<C: ?Sized> {
	type Error;

	/// Runs after the bound operation executed successfully.
	fn post_execute(&mut self, ctx: &mut C) -> Result<(), Self::Error>;

	/// Runs after the bound operation was rolled back.
	fn post_rollback(&mut self, ctx: &mut C);
}
