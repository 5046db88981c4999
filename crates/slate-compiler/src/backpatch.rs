//! Deferred resolution of call targets.
//!
//! A call to a function that has no entry instruction yet is emitted with
//! its displacement unset and recorded as a [`PendingCall`]. Once every
//! function has been emitted, [`resolve_pending_calls`] restores the scope
//! each call was lowered in, resolves the signature again and patches the
//! displacement.
//!
//! Scopes are captured into a [`SnapshotArena`]. Calls lowered in the same
//! scope share one snapshot, found through an xxh64 fingerprint.

use rustc_hash::FxHashMap;
use slate_core::{FatalError, Value};
use slate_ir::CallExpr;
use xxhash_rust::xxh64::xxh64;

use crate::bytecode::{Instruction, OpCode};
use crate::context::CompilationContext;
use crate::resolve::CallTarget;
use crate::scope::{CompiledVariable, ScopeSnapshot, VariableTable};
use crate::symbols::FunctionId;

const SEP: u64 = 0x9E37_79B9_7F4A_7C15;

// ============================================================================
// Snapshots
// ============================================================================

/// Handle to a captured scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotId(u32);

/// Deduplicated scope snapshots.
#[derive(Debug, Default)]
pub struct SnapshotArena {
    snapshots: Vec<ScopeSnapshot>,
    by_fingerprint: FxHashMap<u64, Vec<SnapshotId>>,
}

fn fingerprint_variable(hash: u64, variable: &CompiledVariable) -> u64 {
    let text = xxh64(variable.name.as_bytes(), 0) ^ xxh64(variable.ty.as_bytes(), 1);
    let flags = u64::from(variable.is_heap_indirected) | (u64::from(variable.is_global) << 1);
    hash.wrapping_mul(SEP)
        .wrapping_add(text ^ (variable.stack_offset as u64) ^ (flags << 62))
}

/// Fingerprint of the parameter and local tables and the global count.
pub fn fingerprint(scope: &VariableTable) -> u64 {
    let mut hash = xxh64(b"params", 0);
    for variable in scope.params() {
        hash = fingerprint_variable(hash, variable);
    }
    hash = hash.wrapping_mul(SEP) ^ xxh64(b"locals", 0);
    for variable in scope.locals() {
        hash = fingerprint_variable(hash, variable);
    }
    hash.wrapping_mul(SEP) ^ scope.visible_globals().len() as u64
}

impl SnapshotArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the scope, reusing an identical earlier snapshot.
    pub fn capture(&mut self, scope: &VariableTable) -> SnapshotId {
        let key = fingerprint(scope);
        let snapshot = scope.snapshot();
        if let Some(candidates) = self.by_fingerprint.get(&key) {
            for id in candidates {
                let existing = &self.snapshots[id.0 as usize];
                if *existing == snapshot {
                    return *id;
                }
            }
        }
        let id = SnapshotId(self.snapshots.len() as u32);
        self.snapshots.push(snapshot);
        self.by_fingerprint.entry(key).or_default().push(id);
        id
    }

    pub fn get(&self, id: SnapshotId) -> Option<&ScopeSnapshot> {
        self.snapshots.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

// ============================================================================
// Pending Calls
// ============================================================================

/// What a pending call has to be resolved from.
#[derive(Debug, Clone, Copy)]
pub enum CallSite<'ast> {
    /// A call expression, re-resolved in its captured scope.
    Expr(&'ast CallExpr<'ast>),
    /// A call the compiler generated for a known function.
    Direct(FunctionId),
}

/// A call instruction waiting for its target's address.
#[derive(Debug, Clone)]
pub struct PendingCall<'ast> {
    pub instruction: usize,
    pub site: CallSite<'ast>,
    /// Readable signature, for diagnostics.
    pub signature: String,
    pub snapshot: SnapshotId,
    pub source_file: String,
}

/// Every call emitted before its target had an address.
#[derive(Debug, Default)]
pub struct BackpatchTable<'ast> {
    pending: Vec<PendingCall<'ast>>,
    snapshots: SnapshotArena,
}

impl<'ast> BackpatchTable<'ast> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a call expression together with the scope it was lowered in.
    pub fn record(
        &mut self,
        instruction: usize,
        site: CallSite<'ast>,
        signature: String,
        scope: &VariableTable,
        source_file: &str,
    ) {
        let snapshot = self.snapshots.capture(scope);
        self.pending.push(PendingCall {
            instruction,
            site,
            signature,
            snapshot,
            source_file: source_file.to_string(),
        });
    }

    /// Forget calls recorded at `instruction` or later, after the emitter
    /// dropped those instructions.
    pub fn discard_from(&mut self, instruction: usize) {
        self.pending.retain(|call| call.instruction < instruction);
    }

    pub fn pending(&self) -> &[PendingCall<'ast>] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of distinct scopes captured.
    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    fn take(&mut self) -> (Vec<PendingCall<'ast>>, SnapshotArena) {
        (
            std::mem::take(&mut self.pending),
            std::mem::take(&mut self.snapshots),
        )
    }
}

// ============================================================================
// Resolution
// ============================================================================

fn internal(message: String) -> FatalError {
    FatalError::Internal { message }
}

/// Patch every pending call in `code`.
///
/// Returns the number of calls patched. A call that resolved while its
/// function was being lowered must resolve again here; failure is a
/// compiler bug and aborts the compilation.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn resolve_pending_calls(
    ctx: &mut CompilationContext<'_>,
    code: &mut [Instruction],
) -> Result<usize, FatalError> {
    let (pending, snapshots) = ctx.backpatch.take();
    let saved_scope = ctx.scope.snapshot();
    let saved_file = ctx.current_file.clone();

    tracing::debug!(
        calls = pending.len(),
        snapshots = snapshots.len(),
        "resolving pending calls"
    );

    for call in &pending {
        let target = match call.site {
            CallSite::Direct(id) => id,
            CallSite::Expr(expr) => {
                let snapshot = snapshots.get(call.snapshot).ok_or_else(|| {
                    internal(format!("missing scope snapshot for '{}'", call.signature))
                })?;
                ctx.scope.restore(snapshot);
                ctx.set_file(&call.source_file);
                match ctx.resolve_call(expr) {
                    Ok(CallTarget::Function(id)) | Ok(CallTarget::Method(id)) => id,
                    Ok(_) => {
                        return Err(internal(format!(
                            "'{}' no longer resolves to a compiled function",
                            call.signature
                        )));
                    }
                    Err(error) => {
                        return Err(internal(format!(
                            "'{}' failed to resolve during backpatch: {}",
                            call.signature, error
                        )));
                    }
                }
            }
        };

        let entry = ctx.symbols.function(target).entry.ok_or_else(|| {
            internal(format!("'{}' was never compiled", call.signature))
        })?;
        let instruction = code.get_mut(call.instruction).ok_or_else(|| {
            internal(format!("call site {} out of range", call.instruction))
        })?;
        if instruction.op != OpCode::Call {
            return Err(internal(format!(
                "instruction {} is {}, expected CALL",
                call.instruction,
                instruction.op.name()
            )));
        }
        instruction.operand0 = Some(Value::Int(entry as i64 - call.instruction as i64));
        tracing::trace!(
            instruction = call.instruction,
            entry,
            signature = %call.signature,
            "patched call"
        );
    }

    ctx.scope.restore(&saved_scope);
    ctx.set_file(&saved_file);
    Ok(pending.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_core::Span;

    #[test]
    fn identical_scopes_share_a_snapshot() {
        let mut scope = VariableTable::new();
        scope.push_frame();
        scope.declare_local("a", "int", false, Span::default());

        let mut arena = SnapshotArena::new();
        let first = arena.capture(&scope);
        let second = arena.capture(&scope);
        assert_eq!(first, second);
        assert_eq!(arena.len(), 1);

        scope.declare_local("b", "int", false, Span::default());
        let third = arena.capture(&scope);
        assert_ne!(first, third);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn fingerprint_depends_on_types() {
        let mut a = VariableTable::new();
        a.push_frame();
        a.declare_local("x", "int", false, Span::default());

        let mut b = VariableTable::new();
        b.push_frame();
        b.declare_local("x", "string", false, Span::default());

        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn table_records_calls() {
        let scope = VariableTable::new();
        let mut table = BackpatchTable::new();
        table.record(3, CallSite::Direct(FunctionId(0)), "main()".into(), &scope, "m.sl");
        table.record(7, CallSite::Direct(FunctionId(1)), "f()".into(), &scope, "m.sl");
        assert_eq!(table.len(), 2);
        assert_eq!(table.snapshot_count(), 1);
        assert_eq!(table.pending()[1].instruction, 7);

        table.discard_from(5);
        assert_eq!(table.len(), 1);
        assert_eq!(table.pending()[0].instruction, 3);
    }

    #[test]
    fn snapshots_differ_by_visible_globals() {
        let mut scope = VariableTable::new();
        let mut arena = SnapshotArena::new();
        let before = arena.capture(&scope);
        scope.declare_global("math", "int", Span::default()).unwrap();
        let after = arena.capture(&scope);

        assert_ne!(before, after);
        assert_eq!(arena.get(before).map(|s| s.globals), Some(0));
        assert_eq!(arena.get(after).map(|s| s.globals), Some(1));
    }
}
