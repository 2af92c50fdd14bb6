//! Property-based tests for the IA-32 decoder.
//!
//! These verify invariants that should hold for all inputs:
//! - Decoding never panics on arbitrary bytes
//! - Decoding is deterministic (same input, same output)
//! - Successful decodes consume a bounded, non-zero number of bytes
//! - Duplicated prefixes are always rejected
//! - LOCK/REP pairing legality holds across the whole map

use proptest::prelude::*;

use retro86_core::{Bitness, Opcode, Operand, Repeat};
use retro86_disasm::{DecodeError, Ia32Disassembler};

fn decoders() -> [Ia32Disassembler; 2] {
    [
        Ia32Disassembler::new(Bitness::Bits16),
        Ia32Disassembler::new(Bitness::Bits32),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(10000))]

    /// Decoding arbitrary bytes never panics, in either processor mode.
    #[test]
    fn decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..24)) {
        for disasm in decoders() {
            let _ = disasm.decode_slice(&bytes, 0x1000);
        }
    }

    /// Successful decodes consume between 1 and 15 bytes.
    #[test]
    fn decoded_size_is_bounded(bytes in prop::collection::vec(any::<u8>(), 1..24)) {
        for disasm in decoders() {
            if let Ok((_, size)) = disasm.decode_slice(&bytes, 0x1000) {
                prop_assert!(size >= 1, "an instruction consumes at least one byte");
                prop_assert!(size <= 15, "IA-32 instructions never exceed 15 bytes");
                prop_assert!(size <= bytes.len());
            }
        }
    }

    /// Decoding is deterministic: same input always produces same output.
    #[test]
    fn decode_is_deterministic(bytes in prop::collection::vec(any::<u8>(), 1..24)) {
        for disasm in decoders() {
            let first = disasm.decode_slice(&bytes, 0x1000);
            let second = disasm.decode_slice(&bytes, 0x1000);
            prop_assert_eq!(first, second);
        }
    }

    /// A successful decode records the address the stream started at.
    #[test]
    fn decoded_address_matches(
        bytes in prop::collection::vec(any::<u8>(), 1..24),
        address in 0x1000u64..0xFFFF_0000u64
    ) {
        for disasm in decoders() {
            if let Ok((instruction, _)) = disasm.decode_slice(&bytes, address) {
                prop_assert_eq!(instruction.address, address);
            }
        }
    }

    /// Finished instructions never carry the Invalid mnemonic and never
    /// exceed three operands.
    #[test]
    fn decoded_structure_is_valid(bytes in prop::collection::vec(any::<u8>(), 1..24)) {
        for disasm in decoders() {
            if let Ok((instruction, _)) = disasm.decode_slice(&bytes, 0x1000) {
                prop_assert!(instruction.opcode != Opcode::Invalid);
                prop_assert!(instruction.operand_count() <= 3);
            }
        }
    }

    /// A LOCK prefix on a successful decode implies a lockable mnemonic
    /// and a non-register destination.
    #[test]
    fn lock_survivors_are_legal(bytes in prop::collection::vec(any::<u8>(), 1..24)) {
        let disasm = Ia32Disassembler::new(Bitness::Bits32);
        let mut prefixed = vec![0xF0];
        prefixed.extend_from_slice(&bytes);
        if let Ok((instruction, _)) = disasm.decode_slice(&prefixed, 0x1000) {
            prop_assert!(instruction.locked);
            prop_assert!(instruction.opcode.accepts_lock());
            prop_assert!(!matches!(instruction.operand(0), Some(Operand::Register(_))));
        }
    }

    /// A repeat prefix on a successful decode implies a string mnemonic.
    #[test]
    fn repeat_survivors_are_string_ops(
        repne in prop::bool::ANY,
        bytes in prop::collection::vec(any::<u8>(), 1..24)
    ) {
        let disasm = Ia32Disassembler::new(Bitness::Bits32);
        let mut prefixed = vec![if repne { 0xF2 } else { 0xF3 }];
        prefixed.extend_from_slice(&bytes);
        if let Ok((instruction, _)) = disasm.decode_slice(&prefixed, 0x1000) {
            if repne {
                prop_assert_eq!(instruction.repeat, Repeat::NotEqual);
                prop_assert!(instruction.opcode.accepts_repne());
            } else {
                prop_assert_eq!(instruction.repeat, Repeat::Equal);
                prop_assert!(instruction.opcode.accepts_rep());
            }
        }
    }

    /// Sequential decoding over a buffer covers every byte exactly once.
    #[test]
    fn sequential_decode_covers_all_bytes(bytes in prop::collection::vec(any::<u8>(), 16..96)) {
        let disasm = Ia32Disassembler::new(Bitness::Bits32);
        let results = disasm.disassemble_all(&bytes, 0x1000);
        let mut offset = 0;
        for result in &results {
            match result {
                Ok(_) => {
                    let (_, size) = disasm
                        .decode_slice(&bytes[offset..], 0x1000 + offset as u64)
                        .expect("re-decode of a good instruction");
                    prop_assert!(size >= 1);
                    offset += size;
                }
                Err(_) => offset += 1,
            }
        }
        prop_assert_eq!(offset, bytes.len());
    }
}

// =============================================================================
// Prefix category properties
// =============================================================================

/// The prefix bytes, grouped the way the duplicate check groups them.
const PREFIX_CATEGORIES: [&[u8]; 5] = [
    &[0x66],
    &[0x67],
    &[0x26, 0x2E, 0x36, 0x3E, 0x64, 0x65],
    &[0xF0],
    &[0xF2, 0xF3],
];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// Two prefixes of the same category always raise a duplicate error,
    /// whatever follows.
    #[test]
    fn same_category_prefix_twice_is_rejected(
        category in 0usize..PREFIX_CATEGORIES.len(),
        pick_a in any::<prop::sample::Index>(),
        pick_b in any::<prop::sample::Index>(),
        tail in prop::collection::vec(any::<u8>(), 0..8)
    ) {
        let members = PREFIX_CATEGORIES[category];
        let mut bytes = vec![*pick_a.get(members), *pick_b.get(members)];
        bytes.extend_from_slice(&tail);
        for disasm in decoders() {
            let err = disasm.decode_slice(&bytes, 0x1000).unwrap_err();
            prop_assert!(
                matches!(err, DecodeError::DuplicatePrefix { .. }),
                "expected duplicate-prefix error, got {err:?}"
            );
        }
    }

    /// Prefixes of distinct categories collect in any order.
    #[test]
    fn distinct_category_prefixes_collect(order in prop::bool::ANY) {
        let disasm = Ia32Disassembler::new(Bitness::Bits32);
        // segment override + operand size around a register add
        let bytes: &[u8] = if order {
            &[0x26, 0x66, 0x03, 0xC3]
        } else {
            &[0x66, 0x26, 0x03, 0xC3]
        };
        let (instruction, size) = disasm.decode_slice(bytes, 0x1000).unwrap();
        prop_assert_eq!(instruction.opcode, Opcode::Add);
        prop_assert_eq!(size, 4);
    }
}
