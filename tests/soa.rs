//
// Copyright 2026 bjdata Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! Concrete Structure-of-Arrays scenarios (spec.md §8, scenarios 3-5).

use std::rc::Rc;

use bjdata::{encode_to_bytes, Column, Config, Field, NumericMarker, NumericValue, SoaFormat, Tabular, Value};

fn column_major_config() -> Config {
    Config {
        soa_format: Some(SoaFormat::Column),
        ..Config::default()
    }
}

#[test]
fn test_soa_two_row_record_schema_and_payload() {
    let tabular = Value::Tabular(Rc::new(Tabular {
        dims: vec![2],
        fields: vec![
            Field::new(
                "id",
                Column::Numeric {
                    marker: NumericMarker::I8,
                    values: vec![NumericValue::I8(1), NumericValue::I8(2)],
                },
            ),
            Field::new("name", Column::String(vec!["A".to_string(), "BB".to_string()])),
        ],
    }));

    let bytes = encode_to_bytes(&tabular, &column_major_config()).unwrap();

    let expected = vec![
        b'{', b'$', b'{', // open, type qualifier, schema object open
        b'U', 2, b'i', b'd', b'i', // "id" -> i8 marker
        b'U', 4, b'n', b'a', b'm', b'e', b'S', b'U', 2, // "name" -> fixed string, length 2
        b'}', b'#', b'U', 2, // schema close, count=2
        1, 2, // id column
        b'A', 0, b'B', b'B', // name column, "A" padded, "BB" exact
    ];
    assert_eq!(bytes, expected);
}

#[test]
fn test_soa_layout_picker_reverts_to_fixed_below_dict_threshold() {
    let tabular = Value::Tabular(Rc::new(Tabular {
        dims: vec![4],
        fields: vec![Field::new(
            "name",
            Column::String(vec!["x".into(), "y".into(), "x".into(), "y".into()]),
        )],
    }));

    let bytes = encode_to_bytes(&tabular, &column_major_config()).unwrap();

    let expected = vec![
        b'{', b'$', b'{', b'U', 4, b'n', b'a', b'm', b'e', b'S', b'U', 1, b'}', b'#', b'U', 4,
        b'x', b'y', b'x', b'y',
    ];
    assert_eq!(bytes, expected);
}

#[test]
fn test_soa_offset_layout_trailer_has_n_plus_one_monotonic_entries() {
    let strings: Vec<String> = (0..100)
        .map(|i| format!("item-{:03}-{}", i, "x".repeat(40 + (i % 40))))
        .collect();
    let total: usize = strings.iter().map(|s| s.len()).sum();

    let tabular = Value::Tabular(Rc::new(Tabular {
        dims: vec![100],
        fields: vec![Field::new("name", Column::String(strings.clone()))],
    }));

    let bytes = encode_to_bytes(&tabular, &column_major_config()).unwrap();

    // Every string here is unique and long, so the picker must choose the
    // offset layout (never dict, since U/N = 1 > 0.3).
    let off_w = if total <= 255 {
        1
    } else if total <= 65535 {
        2
    } else {
        4
    };
    let trailer_len = 101 * off_w + total;
    assert!(bytes.len() >= trailer_len);
    let trailer_start = bytes.len() - trailer_len;

    let read_entry = |offset: usize| -> u32 {
        match off_w {
            1 => bytes[offset] as u32,
            2 => u16::from_le_bytes([bytes[offset], bytes[offset + 1]]) as u32,
            _ => u32::from_le_bytes([
                bytes[offset],
                bytes[offset + 1],
                bytes[offset + 2],
                bytes[offset + 3],
            ]),
        }
    };

    let mut offsets = Vec::with_capacity(101);
    for i in 0..101 {
        offsets.push(read_entry(trailer_start + i * off_w));
    }
    assert_eq!(offsets.len(), 101);
    assert_eq!(offsets[0], 0);
    assert_eq!(offsets[100], total as u32);
    for pair in offsets.windows(2) {
        assert!(pair[1] >= pair[0]);
    }

    let buffer_start = trailer_start + 101 * off_w;
    let concatenated = strings.concat();
    assert_eq!(&bytes[buffer_start..], concatenated.as_bytes());
}

#[test]
fn test_soa_row_major_interleaves_fields() {
    let tabular = Value::Tabular(Rc::new(Tabular {
        dims: vec![2],
        fields: vec![
            Field::new(
                "id",
                Column::Numeric {
                    marker: NumericMarker::U8,
                    values: vec![NumericValue::U8(10), NumericValue::U8(20)],
                },
            ),
            Field::new(
                "flag",
                Column::Bool(vec![true, false]),
            ),
        ],
    }));

    let config = Config {
        soa_format: Some(SoaFormat::Row),
        ..Config::default()
    };
    let bytes = encode_to_bytes(&tabular, &config).unwrap();

    // Row-major opens with `[`, not `{`.
    assert_eq!(bytes[0], b'[');
    // Interleaved payload: id0, flag0, id1, flag1 -- trailing four bytes.
    let payload = &bytes[bytes.len() - 4..];
    assert_eq!(payload, &[10, b'T', 20, b'F']);
}

#[test]
fn test_soa_uniform_mapping_list_requires_explicit_soa_format() {
    let rows = Value::array(vec![
        Value::object(vec![("a".into(), Value::Integer(1))]).unwrap(),
        Value::object(vec![("a".into(), Value::Integer(2))]).unwrap(),
    ]);

    // Without an explicit soa_format, this is a plain array of objects.
    let plain = encode_to_bytes(&rows, &Config::default()).unwrap();
    assert_eq!(plain[0], b'[');
    assert_eq!(plain[1], b'{');

    // With soa_format set, the uniform key set triggers SOA encoding.
    let soa = encode_to_bytes(&rows, &column_major_config()).unwrap();
    assert_eq!(soa[0], b'{');
    assert_eq!(soa[1], b'$');
}
