//! Property-based round trips through the value and tree codecs.

use proptest::prelude::*;

use ghjson::codec::{CodecRegistry, TreeCodec};
use ghjson::model::{Color, DataTree, GhPath, Interval, Point3, TypedValue, Vector3};

fn coord() -> impl Strategy<Value = f64> {
    -1.0e9..1.0e9f64
}

fn typed_value() -> impl Strategy<Value = TypedValue> {
    prop_oneof![
        any::<i64>().prop_map(TypedValue::Integer),
        any::<bool>().prop_map(TypedValue::Boolean),
        coord().prop_map(TypedValue::Number),
        ".*".prop_map(TypedValue::Text),
        any::<[u8; 4]>().prop_map(|[a, r, g, b]| TypedValue::Color(Color { a, r, g, b })),
        (coord(), coord(), coord()).prop_map(|(x, y, z)| TypedValue::Point(Point3::new(x, y, z))),
        (coord(), coord(), coord()).prop_map(|(x, y, z)| TypedValue::Vector(Vector3 { x, y, z })),
        (coord(), coord()).prop_map(|(a, b)| TypedValue::Interval(Interval::new(a, b))),
    ]
}

fn tree_item() -> impl Strategy<Value = Option<TypedValue>> {
    prop::option::weighted(0.8, typed_value())
}

fn data_tree() -> impl Strategy<Value = DataTree<TypedValue>> {
    prop::collection::btree_map(
        prop::collection::vec(0u32..8, 0..4),
        prop::collection::vec(tree_item(), 0..5),
        0..5,
    )
    .prop_map(|branches| {
        let mut tree = DataTree::new();
        for (path, items) in branches {
            tree.insert_branch(GhPath::new(path), items);
        }
        tree
    })
}

proptest! {
    #[test]
    fn value_roundtrip(value in typed_value()) {
        let codecs = CodecRegistry::with_builtins();
        let encoded = codecs.encode(&value).unwrap();
        prop_assert_eq!(codecs.decode(&encoded).unwrap(), value);
    }

    #[test]
    fn encoding_is_deterministic(value in typed_value()) {
        let codecs = CodecRegistry::with_builtins();
        prop_assert_eq!(codecs.encode(&value).unwrap(), codecs.encode(&value).unwrap());
    }

    #[test]
    fn prefix_lookup_ignores_case(value in typed_value()) {
        let codecs = CodecRegistry::with_builtins();
        let encoded = codecs.encode(&value).unwrap();
        let (prefix, payload) = encoded.split_once(':').unwrap();
        let shouted = format!("{}:{}", prefix.to_uppercase(), payload);
        prop_assert_eq!(codecs.decode(&shouted).unwrap(), value);
    }

    #[test]
    fn tree_roundtrip(tree in data_tree()) {
        let codecs = CodecRegistry::with_builtins();
        let trees = TreeCodec::new(&codecs);
        let json = trees.flatten_values(&tree);
        let back = trees.unflatten_values(&json).unwrap();
        prop_assert_eq!(back.path_count(), tree.path_count());
        prop_assert_eq!(back.data_count(), tree.data_count());
        prop_assert_eq!(back, tree);
    }

    #[test]
    fn tree_survives_text(tree in data_tree()) {
        let codecs = CodecRegistry::with_builtins();
        let trees = TreeCodec::new(&codecs);
        let text = serde_json::to_string(&trees.flatten_values(&tree)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(trees.unflatten_values(&json).unwrap(), tree);
    }
}
