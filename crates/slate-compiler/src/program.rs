//! The compiled artifact.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::bytecode::Instruction;
use crate::debug_info::DebugInfo;
use crate::symbols::{CompiledFunction, CompiledType};

/// A whole program lowered to one flat instruction array.
///
/// Layout: `[global setup][entry calls][global teardown][Exit][functions...]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledProgram {
    pub instructions: Vec<Instruction>,
    /// Offset-table key (`ns.name,T1` or `Type.name,T1`) to entry index.
    pub function_offsets: FxHashMap<String, usize>,
    /// Every registered function, including builtins and eliminated ones.
    pub functions: Vec<CompiledFunction>,
    /// Structs in registration order.
    pub structs: Vec<CompiledType>,
    /// Classes in registration order.
    pub classes: Vec<CompiledType>,
    /// First instruction of the global setup section.
    pub global_setup_index: usize,
    /// First pop of the global teardown section.
    pub global_teardown_index: usize,
    pub debug_info: DebugInfo,
}

impl CompiledProgram {
    /// Entry instruction of a function by offset-table key.
    pub fn entry_of(&self, key: &str) -> Option<usize> {
        self.function_offsets.get(key).copied()
    }

    /// A registered function by offset-table key.
    pub fn function(&self, key: &str) -> Option<&CompiledFunction> {
        self.functions.iter().find(|f| f.offset_key() == key)
    }

    /// Functions that received instructions.
    pub fn compiled_functions(&self) -> impl Iterator<Item = &CompiledFunction> + '_ {
        self.functions.iter().filter(|f| f.entry.is_some())
    }

    /// A struct or class by name.
    pub fn type_named(&self, name: &str) -> Option<&CompiledType> {
        self.structs
            .iter()
            .chain(&self.classes)
            .find(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// One instruction per line, prefixed with its index.
impl fmt::Display for CompiledProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.instructions.len().to_string().len();
        for (index, instruction) in self.instructions.iter().enumerate() {
            writeln!(f, "{:>width$}  {}", index, instruction, width = width)?;
        }
        Ok(())
    }
}
