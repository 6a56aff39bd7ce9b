// Jump/call cross-reference collector.
//
// The discovery pass records every branch, jump, and call target here.
// enumerate() then assigns canonical Label_N names in address order, and
// the final pass asks for the declaration block due at each address.

use std::collections::BTreeMap;

use crate::opcodes::Opcode;

struct Reference {
    from: usize,
    op: Opcode,
}

pub struct LabelTable {
    refs: BTreeMap<usize, Vec<Reference>>,
    names: BTreeMap<usize, String>,
}

impl LabelTable {
    pub fn new() -> Self {
        LabelTable {
            refs: BTreeMap::new(),
            names: BTreeMap::new(),
        }
    }

    /// Record that the instruction at `from` targets address `to`.
    /// Duplicate (from, to) pairs collapse to one reference, so re-recording
    /// during the final pass is harmless.
    pub fn record_reference(&mut self, from: usize, to: usize, op: Opcode) {
        let refs = self.refs.entry(to).or_default();
        if !refs.iter().any(|r| r.from == from) {
            refs.push(Reference { from, op });
        }
    }

    /// Assign canonical names to all recorded targets, in address order.
    /// Called once, between the discovery and final passes.
    pub fn enumerate(&mut self) {
        self.names.clear();
        for (i, &target) in self.refs.keys().enumerate() {
            self.names.insert(target, format!("Label_{}", i + 1));
        }
    }

    pub fn name_of(&self, target: usize) -> Option<&str> {
        self.names.get(&target).map(String::as_str)
    }

    /// Label declaration block due at this address, or None. The block
    /// lists each referencing site, then the label line itself.
    pub fn declarations_at(&self, pos: usize) -> Option<String> {
        let name = self.names.get(&pos)?;
        let mut block = String::from("\n");
        if let Some(refs) = self.refs.get(&pos) {
            for r in refs {
                block.push_str(&format!(
                    "; Referenced from 0x{:04x} ({})\n",
                    r.from,
                    r.op.mnemonic()
                ));
            }
        }
        block.push_str(&format!("{}:\n", name));
        Some(block)
    }
}
