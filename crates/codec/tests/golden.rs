//! Known glyph programs, their compressed streams, and their listings.

use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use sparkhints_codec::{
    Axis, CompressedHints, DeltaKind, Error, FusedKey, Options, PhaseMap, SparkHints, decode,
    encode, unpack_huffman,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn hex(text: &str) -> Vec<u8> {
    text.split_whitespace()
        .map(|byte| u8::from_str_radix(byte, 16).unwrap())
        .collect()
}

const STROKE_PROGRAM: &str = "7F F9 00 41 A2 00 0E 01 5A 00 A2 00 0E 01 59 7F 0B 01 5D 01 00 07 5B \
                              5D 01 00 20 5A 5D 01 00 21 5A 00 5D 01 00 20 58 5D 01 00 21 58 \
                              01 AA 00 13 01 59 5D 01 00 08 5A 5D 01 00 0A 5A 5D 01 00 09 59";

const STROKE_NYBBLES: [u8; 68] = [
    3, 8, 5, 0, 7, 5, 10, 4, 6, 13, 6, 1, 5, 9, 4, 6, 13, 14, 6, 0, 1, 2, 5, 9, 4, 1, 2, 9, 8, 10,
    0, 2, 5, 10, 4, 0, 2, 1, 8, 2, 5, 6, 10, 8, 2, 0, 8, 8, 1, 7, 0, 2, 5, 11, 8, 6, 1, 1, 2, 4, 15,
    4, 8, 2, 0, 8, 8, 15,
];

const STROKE_HUFFMAN: &str = "7f f7 00 21 38 50 76 92 e3 30 97 4c 43 2c 17 2c f2 3e d7 73 b8 52 \
                              ef 47 74 7f a3 99 98 86 a3 bd 40";

#[cfg(feature = "raw-format")]
const STROKE_RAW: &str = "7f f7 00 26 38 50 75 a4 6d 61 59 46 de 60 12 59 41 29 8a 02 5a 40 21 \
                          82 56 a8 20 88 17 02 5b 86 11 24 f4 82 08 8f";

const KERN_PROGRAM: &str = "7F F9 00 26 A2 00 0E 01 90 A2 00 05 01 90 A2 00 04 01 55 7F 0B \
                            A7 01 00 1B 02 90 50 5D 01 00 1A 5C 5D 01 00 15 59";

const KERN_NYBBLES: [u8; 50] = [
    0, 7, 5, 0, 4, 1, 2, 3, 3, 4, 0, 2, 8, 13, 13, 1, 7, 0, 3, 5, 5, 13, 14, 1, 1, 4, 15, 4, 6, 2,
    3, 9, 9, 1, 6, 0, 3, 5, 9, 4, 15, 4, 0, 2, 2, 8, 4, 1, 8, 15,
];

fn stroke_maps() -> (PhaseMap, PhaseMap) {
    let mut pre = PhaseMap::new();
    pre.insert(Axis::X, 14, 0.375, DeltaKind::StrokeDelta, Some(14)).unwrap();
    pre.insert(Axis::Y, 14, 0.25, DeltaKind::StrokeDelta, Some(14)).unwrap();

    let mut post = PhaseMap::new();
    for (shift, kind, point) in [
        (0.25, DeltaKind::DeltaP, 9),
        (0.25, DeltaKind::DeltaL, 19),
        (0.375, DeltaKind::DeltaP, 8),
        (0.375, DeltaKind::DeltaP, 10),
        (0.375, DeltaKind::DeltaP, 32),
        (0.375, DeltaKind::DeltaP, 33),
        (0.5, DeltaKind::DeltaP, 7),
    ] {
        post.insert(Axis::X, 14, shift, kind, Some(point)).unwrap();
    }
    post.insert(Axis::Y, 14, 0.125, DeltaKind::DeltaP, Some(32)).unwrap();
    post.insert(Axis::Y, 14, 0.125, DeltaKind::DeltaP, Some(33)).unwrap();
    (pre, post)
}

#[test]
fn stroke_program_parses() {
    init();
    let program = SparkHints::parse(&hex(STROKE_PROGRAM)).unwrap();
    assert!(program.gray);
    assert_eq!(
        program.to_string(),
        "STROKEDELTA: Point 14 3/8@14\n\
         SVTCA[y]\n\
         STROKEDELTA: Point 14 1/4@14\n\
         RTGAH\n\
         SVTCA[x]\n\
         DELTAP: Point 7 1/2@14\n\
         DELTAP: Point 32 3/8@14\n\
         DELTAP: Point 33 3/8@14\n\
         SVTCA[y]\n\
         DELTAP: Point 32 1/8@14\n\
         DELTAP: Point 33 1/8@14\n\
         SVTCA[x]\n\
         DELTAL: Point 19 1/4@14\n\
         DELTAP: Point 8 3/8@14\n\
         DELTAP: Point 10 3/8@14\n\
         DELTAP: Point 9 1/4@14\n"
    );
    let (pre, post) = stroke_maps();
    assert_eq!(program.analyze().unwrap(), (Some(pre), post));
}

#[test]
fn stroke_program_compresses() {
    init();
    let (pre, post) = stroke_maps();
    let stream = encode(Some(&pre), &post).unwrap();
    assert_eq!(stream.as_slice(), &STROKE_NYBBLES);
    assert_eq!(decode(&stream).unwrap(), (Some(pre), post));

    let program = SparkHints::parse(&hex(STROKE_PROGRAM)).unwrap();
    let hints = CompressedHints::from_spark(&program, &Options::new().verify(true)).unwrap();
    assert_eq!(hints.stream(), &stream);
    assert_eq!(hints.to_huffman().unwrap(), hex(STROKE_HUFFMAN));
    #[cfg(feature = "raw-format")]
    assert_eq!(sparkhints_codec::pack_raw(&stream, true).unwrap(), hex(STROKE_RAW));

    let (gray, unpacked) = unpack_huffman(&hex(STROKE_HUFFMAN)).unwrap();
    assert!(gray);
    assert_eq!(unpacked, stream);
}

#[test]
fn stroke_program_listing() {
    let hints = CompressedHints::from_huffman(&hex(STROKE_HUFFMAN)).unwrap();
    assert_eq!(
        hints.disassemble().unwrap(),
        "Granularity is 3\n\
         Base shift is 0.125\n\
         Base PPEM is 14\n\
         Base point is 7\n\
         000  5 A   Set shift to 10\n\
         001  4 6   Increment point by 7\n\
         002  D     STROKEDELTA\n\
         003  6 1   Set to y-axis\n\
         004  5 9   Set shift to 9\n\
         005  4 6   Increment point by 7\n\
         006  D     STROKEDELTA\n\
         007  E     RTGAH\n\
         008  6 0   Set to x-axis\n\
         009  1 2   Set auto-increment for point index\n\
         010  5 9   Set shift to 9\n\
         011  4 1   Increment point by 2\n\
         012  2 9   Set repeat to 10\n\
         013  8     DELTAP\n\
         014  A     DELTAL\n\
         015  0 2   Reset point index\n\
         016  5 A   Set shift to 10\n\
         017  4 0   Increment point by 1\n\
         018  2 1   Set repeat to 2\n\
         019  8     DELTAP\n\
         020  2 5   Set repeat to 6\n\
         021  6 A   Increment repeat by 16\n\
         022  8     DELTAP\n\
         023  2 0   Set repeat to 1\n\
         024  8     DELTAP\n\
         025  8     DELTAP\n\
         026  1 7   Set auto-increment for ppem, point index, and shift\n\
         027  0 2   Reset point index\n\
         028  5 B   Set shift to 11\n\
         029  8     DELTAP\n\
         030  6 1   Set to y-axis\n\
         031  1 2   Set auto-increment for point index\n\
         032  4 F   Increment point by 16\n\
         033  4 8   Increment point by 9\n\
         034  2 0   Set repeat to 1\n\
         035  8     DELTAP\n\
         036  8     DELTAP\n\
         037  F     End of hints\n\
         Total bytes = 34\n"
    );
}

#[test]
fn stroke_program_statistics() {
    let hints = CompressedHints::from_huffman(&hex(STROKE_HUFFMAN)).unwrap();
    let stats = hints.statistics_fused().unwrap();
    let expected: BTreeMap<FusedKey, usize> = [
        (FusedKey::Op(8), 8),
        (FusedKey::Op(10), 1),
        (FusedKey::Op(13), 2),
        (FusedKey::Op(14), 1),
        (FusedKey::Op(15), 1),
        (FusedKey::OpArg(0, 2), 2),
        (FusedKey::OpArg(1, 2), 2),
        (FusedKey::OpArg(1, 7), 1),
        (FusedKey::OpArg(2, 0), 2),
        (FusedKey::OpArg(2, 1), 1),
        (FusedKey::OpArg(2, 5), 1),
        (FusedKey::OpArg(2, 9), 1),
        (FusedKey::OpArg(4, 0), 1),
        (FusedKey::OpArg(4, 1), 1),
        (FusedKey::OpArg(4, 6), 2),
        (FusedKey::OpArg(4, 8), 1),
        (FusedKey::OpArg(4, 15), 1),
        (FusedKey::OpArg(5, 9), 2),
        (FusedKey::OpArg(5, 10), 2),
        (FusedKey::OpArg(5, 11), 1),
        (FusedKey::OpArg(6, 0), 1),
        (FusedKey::OpArg(6, 1), 2),
        (FusedKey::OpArg(6, 10), 1),
    ]
    .into_iter()
    .collect();
    assert_eq!(stats.counts, expected);
    assert_eq!(stats.total(), 38);

    let split = hints.statistics().unwrap();
    assert_eq!(split.opcodes[&8], 8);
    assert_eq!(split.opcodes[&4], 6);
    assert_eq!(split.operands[&5], BTreeMap::from([(9, 2), (10, 2), (11, 1)]));
}

#[test]
fn kern_program_round_trip() {
    init();
    let program = SparkHints::parse(&hex(KERN_PROGRAM)).unwrap();
    assert_eq!(
        program.to_string(),
        "STROKEDELTA: Point 14 -1@18\n\
         STROKEDELTA: Point 5 -1@18\n\
         STROKEDELTA: Point 4 -3/8@14\n\
         RTGAH\n\
         DELTAK: Point 27 -1@14, -1@18\n\
         DELTAP: Point 26 5/8@14\n\
         DELTAP: Point 21 1/4@14\n"
    );

    let (pre, post) = program.analyze().unwrap();
    let pre = pre.unwrap();
    assert_eq!(pre.len(), 3);
    assert_eq!(post.len(), 4);
    assert_eq!(pre.min_ppem(), Some(14));

    let hints = CompressedHints::from_spark(&program, &Options::new().verify(true)).unwrap();
    assert_eq!(hints.stream().as_slice(), &KERN_NYBBLES);
    assert_eq!(hints.run().unwrap(), (Some(pre), post));
    assert!(hints.disassemble().unwrap().ends_with("Total bytes = 25\n"));
}

#[test]
fn delta_base_changes_cannot_be_huffman_packed() {
    let mut post = PhaseMap::new();
    post.insert(Axis::X, 13, 0.5, DeltaKind::DeltaP, Some(4)).unwrap();
    post.insert(Axis::X, 70, 0.25, DeltaKind::DeltaP, Some(12)).unwrap();

    let hints = CompressedHints::new(None, &post, &Options::default()).unwrap();
    assert!(matches!(
        hints.to_huffman(),
        Err(Error::MissingHuffmanCode { opcode: 6, operand: Some(4) })
    ));
    assert_eq!(hints.run().unwrap(), (None, post.clone()));

    #[cfg(feature = "raw-format")]
    {
        let raw = hints.to_raw().unwrap();
        assert_eq!(CompressedHints::from_raw(&raw).unwrap().run().unwrap(), (None, post));
    }
}
