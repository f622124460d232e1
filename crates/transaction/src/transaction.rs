use crate::{AtomicOperation, OperationInterceptor};

type BoxedOperation<C, E> = Box<dyn AtomicOperation<C, Error = E>>;
type BoxedInterceptor<C, E> = Box<dyn OperationInterceptor<C, Error = E>>;

/// One operation plus the interceptors bound to it.
struct Step<C: ?Sized, E> {
	operation: BoxedOperation<C, E>,
	interceptors: Vec<BoxedInterceptor<C, E>>,
}

impl<C: ?Sized, E> Step<C, E> {
	fn post_execute(&mut self, ctx: &mut C) -> Result<(), E> {
		for interceptor in &mut self.interceptors {
			interceptor.post_execute(ctx)?;
		}
		Ok(())
	}

	fn rollback(&mut self, ctx: &mut C) {
		self.operation.rollback(ctx);
		for interceptor in &mut self.interceptors {
			interceptor.post_rollback(ctx);
		}
	}
}

/// Ordered list of operations applied with all-or-nothing semantics.
pub struct Transaction<C: ?Sized, E> {
	steps: Vec<Step<C, E>>,
}

impl<C: ?Sized, E> Default for Transaction<C, E> {
	fn default() -> Self {
		Self { steps: Vec::new() }
	}
}

impl<C: ?Sized, E> Transaction<C, E> {
	/// Creates an empty transaction.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends an operation without interceptors.
	pub fn push(&mut self, operation: impl AtomicOperation<C, Error = E> + 'static) -> &mut Self {
		self.steps.push(Step {
			operation: Box::new(operation),
			interceptors: Vec::new(),
		});
		self
	}

	/// Appends an operation with a single bound interceptor.
	pub fn push_intercepted(
		&mut self,
		operation: impl AtomicOperation<C, Error = E> + 'static,
		interceptor: impl OperationInterceptor<C, Error = E> + 'static,
	) -> &mut Self {
		self.push_with_interceptors(operation, vec![Box::new(interceptor)])
	}

	/// Appends an operation with several bound interceptors, run in order.
	pub fn push_with_interceptors(
		&mut self,
		operation: impl AtomicOperation<C, Error = E> + 'static,
		interceptors: Vec<BoxedInterceptor<C, E>>,
	) -> &mut Self {
		self.steps.push(Step {
			operation: Box::new(operation),
			interceptors,
		});
		self
	}

	/// Returns the number of queued operations.
	pub fn len(&self) -> usize {
		self.steps.len()
	}

	/// Returns true if no operation is queued.
	pub fn is_empty(&self) -> bool {
		self.steps.is_empty()
	}

	/// Executes every operation in order.
	///
	/// An operation is considered committed as soon as its `execute` returns
	/// `Ok`, so a failing interceptor rolls back its own operation too.
	///
	/// # Errors
	///
	/// Returns the first error raised by an operation or interceptor, after
	/// every committed operation has been rolled back in reverse order.
	pub fn commit(self, ctx: &mut C) -> Result<Committed<C, E>, E> {
		let total = self.steps.len();
		let mut committed: Vec<Step<C, E>> = Vec::with_capacity(total);

		for (index, mut step) in self.steps.into_iter().enumerate() {
			let operation = step.operation.name();
			if let Err(error) = step.operation.execute(ctx) {
				tracing::warn!(index, operation, committed = committed.len(), "operation failed; rolling back transaction");
				rollback_reverse(committed, ctx);
				return Err(error);
			}

			let intercepted = step.post_execute(ctx);
			committed.push(step);
			if let Err(error) = intercepted {
				tracing::warn!(index, operation, committed = committed.len(), "interceptor failed; rolling back transaction");
				rollback_reverse(committed, ctx);
				return Err(error);
			}
			tracing::trace!(index, operation, "operation executed");
		}

		tracing::debug!(operations = total, "transaction committed");
		Ok(Committed { steps: committed })
	}
}

/// Handle over a successfully committed transaction.
///
/// Dropping it keeps the changes. [`Committed::rollback`] undoes them.
pub struct Committed<C: ?Sized, E> {
	steps: Vec<Step<C, E>>,
}

impl<C: ?Sized, E> Committed<C, E> {
	/// Number of operations that were applied.
	pub fn len(&self) -> usize {
		self.steps.len()
	}

	/// Returns true if the transaction applied nothing.
	pub fn is_empty(&self) -> bool {
		self.steps.is_empty()
	}

	/// Rolls every applied operation back in reverse order.
	pub fn rollback(self, ctx: &mut C) {
		tracing::debug!(operations = self.steps.len(), "rolling back committed transaction");
		rollback_reverse(self.steps, ctx);
	}
}

fn rollback_reverse<C: ?Sized, E>(steps: Vec<Step<C, E>>, ctx: &mut C) {
	for mut step in steps.into_iter().rev() {
		step.rollback(ctx);
	}
}
