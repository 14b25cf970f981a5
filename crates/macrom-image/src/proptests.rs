use crate::{RomBuffer, RomError};
use proptest::prelude::*;
use proptest::test_runner::TestCaseResult;

#[derive(Debug, Clone)]
struct Write {
    offset: usize,
    data: Vec<u8>,
}

const MAX_ROM_SIZE: usize = 4096;
const MAX_WRITES: usize = 32;
const MAX_WRITE_LEN: usize = 512;

fn rom_size_strategy() -> impl Strategy<Value = usize> {
    1usize..=MAX_ROM_SIZE
}

fn offset_strategy(rom_size: usize) -> BoxedStrategy<usize> {
    // Offsets slightly past the end exercise the bounds check as well.
    let any = 0usize..=rom_size + 8;
    let near_end = (0usize..=16).prop_map(move |delta| rom_size.saturating_sub(delta));

    prop_oneof![
        4 => any,
        1 => near_end,
    ]
    .boxed()
}

fn write_strategy(rom_size: usize) -> BoxedStrategy<Write> {
    (
        offset_strategy(rom_size),
        prop::collection::vec(any::<u8>(), 0..=MAX_WRITE_LEN),
    )
        .prop_map(|(offset, data)| Write { offset, data })
        .boxed()
}

fn scenario_strategy() -> BoxedStrategy<(usize, Vec<Write>)> {
    rom_size_strategy()
        .prop_flat_map(|rom_size| {
            (
                Just(rom_size),
                prop::collection::vec(write_strategy(rom_size), 1..=MAX_WRITES),
            )
        })
        .boxed()
}

/// Replay `writes` against a `RomBuffer` and a plain reference model, checking every outcome.
fn run_writes(rom_size: usize, writes: &[Write]) -> TestCaseResult {
    let mut rom = RomBuffer::new(rom_size).unwrap();
    let mut model_data = vec![0u8; rom_size];
    let mut model_mask = vec![false; rom_size];

    for w in writes {
        let len = w.data.len();
        let result = rom.write_bytes(w.offset, &w.data);

        let end = w.offset.checked_add(len).filter(|&end| end <= rom_size);
        match end {
            None => {
                let is_oob = matches!(
                    result,
                    Err(RomError::OutOfBoundsWrite { size, offset, len: l })
                        if size == rom_size && offset == w.offset && l == len
                );
                prop_assert!(is_oob, "expected out-of-bounds for {:?}", w);
            }
            Some(end) => {
                let first_conflict = (w.offset..end).find(|&i| model_mask[i]);
                match first_conflict {
                    Some(at) => {
                        let is_overlap = matches!(
                            result,
                            Err(RomError::OverlappingWrite { at: got, offset, len: l })
                                if got == at && offset == w.offset && l == len
                        );
                        prop_assert!(is_overlap, "expected double-write at {at} for {:?}", w);
                    }
                    None => {
                        prop_assert!(result.is_ok());
                        model_data[w.offset..end].copy_from_slice(&w.data);
                        model_mask[w.offset..end].fill(true);
                    }
                }
            }
        }

        // Rejected writes must leave both arrays untouched.
        prop_assert_eq!(rom.data(), model_data.as_slice());
        prop_assert_eq!(rom.written_mask(), model_mask.as_slice());
    }

    let ranges = rom.written_ranges();
    let covered: usize = ranges.iter().map(|r| r.len()).sum();
    prop_assert_eq!(covered, rom.written_len());
    for pair in ranges.windows(2) {
        // Maximal runs never touch.
        prop_assert!(pair[0].end < pair[1].start);
    }

    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_rom_buffer_matches_reference((rom_size, writes) in scenario_strategy()) {
        run_writes(rom_size, &writes)?;
    }

    #[test]
    fn prop_disjoint_writes_commute(
        (rom_size, split, a, b) in (2usize..=MAX_ROM_SIZE)
            .prop_flat_map(|size| (Just(size), 1..size))
            .prop_flat_map(|(size, split)| (
                Just(size),
                Just(split),
                prop::collection::vec(any::<u8>(), 1..=split),
                prop::collection::vec(any::<u8>(), 1..=size - split),
            ))
    ) {
        // `a` sits at the start of the lower half, `b` at the start of the upper half.
        let mut forward = RomBuffer::new(rom_size).unwrap();
        forward.write_bytes(0, &a).unwrap();
        forward.write_bytes(split, &b).unwrap();

        let mut reverse = RomBuffer::new(rom_size).unwrap();
        reverse.write_bytes(split, &b).unwrap();
        reverse.write_bytes(0, &a).unwrap();

        prop_assert_eq!(forward.data(), reverse.data());
        prop_assert_eq!(forward.written_mask(), reverse.written_mask());
        prop_assert_eq!(forward.written_len(), a.len() + b.len());
    }
}
