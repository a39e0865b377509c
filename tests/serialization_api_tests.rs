//! End-to-end API Surface Tests
//!
//! Exercises the `valpack` facade: encode/decode round trips across
//! codecs and chunk limits, frame compatibility gating, extension hooks,
//! and bytecode version policy.

use std::cell::RefCell;
use std::rc::Rc;

use valpack::prelude::*;
use valpack::{GraphError, WireError};

fn sample_graph() -> Value {
    let mut t = Table::new();
    t.push(Value::Int(1));
    t.push(Value::str("two"));
    t.push(Value::Bool(true));
    t.push(Value::Nil);
    t.set(Value::str("pi"), Value::Float(3.25));
    Value::table(t)
}

// ============================================================================
// Round Trip Tests
// ============================================================================

mod round_trip {
    use super::*;

    #[test]
    fn test_scalar_round_trips() {
        for value in [
            Value::Nil,
            Value::Bool(false),
            Value::Int(i64::MIN),
            Value::Float(-0.0),
            Value::str([0u8, 255, 128]),
        ] {
            let bytes = Encoder::new().to_vec(&value).unwrap();
            let restored = Decoder::new().from_slice(&bytes).unwrap();
            assert!(restored.structural_eq(&value), "{:?}", value);
        }
    }

    #[test]
    fn test_table_round_trip() {
        let original = sample_graph();
        let bytes = Encoder::new().to_vec(&original).unwrap();
        let restored = Decoder::new().from_slice(&bytes).unwrap();
        assert!(restored.structural_eq(&original));
    }

    #[test]
    fn test_every_available_codec_round_trips() {
        let original = sample_graph();
        for &codec in Codec::all() {
            if !codec.available() {
                continue;
            }
            let bytes = Encoder::new().with_codec(codec).to_vec(&original).unwrap();
            let restored = Decoder::new().from_slice(&bytes).unwrap();
            assert!(restored.structural_eq(&original), "codec {:?}", codec);
        }
    }

    #[test]
    fn test_chunk_limit_does_not_change_decoded_value() {
        let original = sample_graph();
        let one_byte_chunks = Encoder::new()
            .with_chunk_limit(1)
            .to_vec(&original)
            .unwrap();
        let unbounded = Encoder::new().to_vec(&original).unwrap();
        assert_ne!(one_byte_chunks, unbounded);

        let a = Decoder::new().from_slice(&one_byte_chunks).unwrap();
        let b = Decoder::new().from_slice(&unbounded).unwrap();
        assert!(a.structural_eq(&original));
        assert!(b.structural_eq(&original));
    }

    #[test]
    fn test_writer_and_reader_transports() {
        let original = sample_graph();
        let mut file = tempfile::tempfile().unwrap();
        Encoder::new().to_writer(&original, &mut file).unwrap();

        use std::io::Seek;
        file.rewind().unwrap();
        let restored = Decoder::new().from_reader(file).unwrap();
        assert!(restored.structural_eq(&original));
    }
}

// ============================================================================
// Graph Shape Tests
// ============================================================================

mod graph_shapes {
    use super::*;

    #[test]
    fn test_cycle_survives_round_trip() {
        let t = Rc::new(RefCell::new(Table::new()));
        t.borrow_mut().push(Value::Int(10));
        t.borrow_mut().push(Value::Table(Rc::clone(&t)));
        let original = Value::Table(t);

        let bytes = Encoder::new().to_vec(&original).unwrap();
        let restored = Decoder::new().from_slice(&bytes).unwrap();

        let outer = restored.as_table().unwrap();
        let back = outer.borrow().array[1].clone();
        assert!(Rc::ptr_eq(outer, back.as_table().unwrap()));
    }

    #[test]
    fn test_shared_subtree_keeps_single_identity() {
        let shared = Rc::new(RefCell::new(Table::new()));
        shared.borrow_mut().push(Value::str("once"));

        let mut outer = Table::new();
        outer.push(Value::Table(Rc::clone(&shared)));
        outer.push(Value::Table(shared));
        let original = Value::table(outer);

        let bytes = Encoder::new().to_vec(&original).unwrap();
        let restored = Decoder::new().from_slice(&bytes).unwrap();

        let table = restored.as_table().unwrap().borrow();
        let a = table.array[0].as_table().unwrap().clone();
        let b = table.array[1].as_table().unwrap().clone();
        assert!(Rc::ptr_eq(&a, &b));

        // Mutating through one handle is visible through the other.
        a.borrow_mut().push(Value::Int(2));
        assert_eq!(b.borrow().array.len(), 2);
    }

    #[test]
    fn test_table_as_its_own_hash_key_round_trips() {
        let t = Rc::new(RefCell::new(Table::new()));
        let self_key = Value::Table(Rc::clone(&t));
        t.borrow_mut().hash.push((self_key, Value::Nil));
        t.borrow_mut().hash.push((Value::table(Table::new()), Value::Int(2)));
        let original = Value::Table(t);

        let bytes = Encoder::new().to_vec(&original).unwrap();
        let restored = Decoder::new().from_slice(&bytes).unwrap();

        let table = restored.as_table().unwrap();
        assert_eq!(table.borrow().hash.len(), 2);
        let first_key = table.borrow().hash[0].0.clone();
        assert!(Rc::ptr_eq(table, first_key.as_table().unwrap()));
        assert!(restored.structural_eq(&original));
    }

    #[test]
    fn test_deep_nesting_within_limit() {
        let mut value = Value::Int(0);
        for _ in 0..100 {
            let mut t = Table::new();
            t.push(value);
            value = Value::table(t);
        }
        let bytes = Encoder::new().to_vec(&value).unwrap();
        let restored = Decoder::new().from_slice(&bytes).unwrap();
        assert!(restored.structural_eq(&value));
    }
}

// ============================================================================
// Frame Compatibility Tests
// ============================================================================

mod frame_compat {
    use super::*;

    #[test]
    fn test_frame_starts_with_magic_and_version() {
        let bytes = Encoder::new().to_vec(&Value::Nil).unwrap();
        assert_eq!(&bytes[..4], b"VPK\0");
        assert_eq!(
            u16::from_le_bytes([bytes[4], bytes[5]]),
            valpack::FORMAT_VERSION
        );
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut bytes = Encoder::new().to_vec(&Value::Nil).unwrap();
        bytes[0] = b'X';
        let err = Decoder::new().from_slice(&bytes).unwrap_err();
        assert!(matches!(err, Error::Wire(WireError::BadMagic)));
    }

    #[test]
    fn test_future_format_version_rejected() {
        let mut bytes = Encoder::new().to_vec(&Value::Nil).unwrap();
        let future = (valpack::FORMAT_VERSION + 1).to_le_bytes();
        bytes[4] = future[0];
        bytes[5] = future[1];
        let err = Decoder::new().from_slice(&bytes).unwrap_err();
        assert!(matches!(
            err,
            Error::Wire(WireError::UnsupportedFormatVersion { found, .. }) if found == valpack::FORMAT_VERSION + 1
        ));
    }

    #[test]
    fn test_truncated_frame_rejected() {
        let bytes = Encoder::new().to_vec(&sample_graph()).unwrap();
        let err = Decoder::new()
            .from_slice(&bytes[..bytes.len() - 1])
            .unwrap_err();
        assert!(matches!(err, Error::Wire(WireError::Truncated { .. })));
    }

    #[test]
    fn test_corrupted_chunk_fails_checksum() {
        let bytes = Encoder::new().to_vec(&sample_graph()).unwrap();
        let mut corrupt = bytes.clone();
        let last = corrupt.len() - 1;
        corrupt[last] ^= 0xFF;
        let err = Decoder::new().from_slice(&corrupt).unwrap_err();
        assert!(matches!(
            err,
            Error::Wire(WireError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_uncompressed_scalar_sequence_is_single_chunk() {
        let mut t = Table::new();
        t.push(Value::Int(1));
        t.push(Value::str("two"));
        t.push(Value::Bool(true));
        t.push(Value::Nil);
        let original = Value::table(t);

        let bytes = Encoder::new().to_vec(&original).unwrap();

        // magic(4) + format(2) + two length-prefixed version strings
        let mut offset = 6;
        for _ in 0..2 {
            let len = u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap());
            offset += 4 + len as usize;
        }
        assert_eq!(bytes[offset], 0, "codec id must be none");
        offset += 1;
        let chunk_count = u64::from_le_bytes(bytes[offset..offset + 8].try_into().unwrap());
        assert_eq!(chunk_count, 1);

        // And the ordered sequence survives intact.
        let restored = Decoder::new().from_slice(&bytes).unwrap();
        assert!(restored.structural_eq(&original));
    }
}

// ============================================================================
// Extension Hook Tests
// ============================================================================

mod extension_hooks {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Point {
        x: i64,
        y: i64,
    }

    fn point_hooks() -> HookRegistry {
        let hooks = HookRegistry::new();
        hooks.set_hooks(
            |data| match data.downcast_ref::<Point>() {
                Some(p) => {
                    let mut payload = p.x.to_le_bytes().to_vec();
                    payload.extend_from_slice(&p.y.to_le_bytes());
                    Ok(Some(ExtensionNode {
                        tag: "point".into(),
                        payload,
                    }))
                }
                None => Ok(None),
            },
            |tag, payload| {
                if tag != "point" || payload.len() != 16 {
                    return Ok(None);
                }
                let x = i64::from_le_bytes(payload[..8].try_into().unwrap());
                let y = i64::from_le_bytes(payload[8..].try_into().unwrap());
                Ok(Some(Value::UserData(Rc::new(UserData::new(
                    "point",
                    Point { x, y },
                )))))
            },
        );
        hooks
    }

    #[test]
    fn test_user_data_round_trip_via_hooks() {
        let hooks = point_hooks();
        let original = Value::UserData(Rc::new(UserData::new("point", Point { x: 3, y: -4 })));

        let bytes = Encoder::new()
            .with_hooks(hooks.clone())
            .to_vec(&original)
            .unwrap();
        let restored = Decoder::new().with_hooks(hooks).from_slice(&bytes).unwrap();

        let data = restored.as_user_data().unwrap();
        assert_eq!(data.downcast_ref::<Point>(), Some(&Point { x: 3, y: -4 }));
    }

    #[test]
    fn test_encode_without_hooks_fails() {
        let original = Value::UserData(Rc::new(UserData::new("point", Point { x: 0, y: 0 })));
        let err = Encoder::new().to_vec(&original).unwrap_err();
        assert!(matches!(
            err,
            Error::Graph(GraphError::Unserializable { .. })
        ));
    }

    #[test]
    fn test_decode_with_wrong_hooks_fails() {
        let original = Value::UserData(Rc::new(UserData::new("point", Point { x: 1, y: 2 })));
        let bytes = Encoder::new()
            .with_hooks(point_hooks())
            .to_vec(&original)
            .unwrap();

        let wrong = HookRegistry::new();
        wrong.set_hooks(|_| Ok(None), |_, _| Ok(None));
        let err = Decoder::new()
            .with_hooks(wrong)
            .from_slice(&bytes)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Graph(GraphError::UnknownExtension { tag }) if tag == "point"
        ));
    }
}

// ============================================================================
// Bytecode Policy Tests
// ============================================================================

mod bytecode_policy {
    use super::*;

    fn function_value() -> Value {
        Value::Function(Rc::new(Function::new(
            vec![0xDE, 0xAD],
            FunctionInfo {
                name: "handler".into(),
                source: "init.script".into(),
                line: 12,
            },
        )))
    }

    #[test]
    fn test_matching_build_revives_bytecode() {
        let bytes = Encoder::new().to_vec(&function_value()).unwrap();
        let restored = Decoder::new().from_slice(&bytes).unwrap();
        let f = restored.as_function().unwrap();
        assert!(f.executable);
        assert_eq!(f.bytecode, vec![0xDE, 0xAD]);
    }

    #[test]
    fn test_foreign_bytecode_tag_degrades_to_stub() {
        let foreign = VersionInfo::new("other 9.9", "other:0099");
        let bytes = Encoder::new()
            .with_version(foreign)
            .to_vec(&function_value())
            .unwrap();

        let restored = Decoder::new().from_slice(&bytes).unwrap();
        let f = restored.as_function().unwrap();
        assert!(!f.executable);
        assert!(f.bytecode.is_empty());
        assert_eq!(f.info.name, "handler");
        assert_eq!(f.info.line, 12);
    }

    #[test]
    fn test_empty_bytecode_tag_degrades_to_stub() {
        let anonymous = VersionInfo::new("other 9.9", "");
        let bytes = Encoder::new()
            .with_version(anonymous)
            .to_vec(&function_value())
            .unwrap();

        let restored = Decoder::new().from_slice(&bytes).unwrap();
        assert!(!restored.as_function().unwrap().executable);
    }

    #[test]
    fn test_stub_degrade_is_not_an_error_for_rest_of_graph() {
        let mut t = Table::new();
        t.push(function_value());
        t.push(Value::Int(5));
        let original = Value::table(t);

        let bytes = Encoder::new()
            .with_version(VersionInfo::new("other", "other:0001"))
            .to_vec(&original)
            .unwrap();
        let restored = Decoder::new().from_slice(&bytes).unwrap();
        let table = restored.as_table().unwrap().borrow();
        assert!(table.array[1].structural_eq(&Value::Int(5)));
    }
}
