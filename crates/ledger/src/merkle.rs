//! Merkle root over an ordered transaction sequence
//!
//! Leaves are `sha256(canonical_json(tx))`. Each level pairs nodes left to
//! right and an odd trailing node is paired with itself. A pair is combined as
//! `sha256(hex(left) || hex(right))`, so the combine is order-sensitive.

use crate::hashing::{digest, Hash};
use serde::Serialize;
use serde_json::{Number, Value};

/// Compute the Merkle root of `items` in the given order.
///
/// An empty sequence yields `sha256("")`.
pub fn merkle_root<T: Serialize>(items: &[T]) -> Hash {
    if items.is_empty() {
        return digest(b"");
    }

    let mut level: Vec<Hash> = items
        .iter()
        .map(|item| digest(canonical_json(item).as_bytes()))
        .collect();

    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let left = &pair[0];
                let right = pair.get(1).unwrap_or(left);
                combine(left, right)
            })
            .collect();
    }

    level[0]
}

fn combine(left: &Hash, right: &Hash) -> Hash {
    let mut buf = String::with_capacity(128);
    buf.push_str(&left.to_hex());
    buf.push_str(&right.to_hex());
    digest(buf.as_bytes())
}

/// Compact JSON with object keys sorted recursively.
///
/// Logically equal values serialize to identical bytes regardless of the
/// order their fields were inserted in.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> String {
    let value = serde_json::to_value(value).expect("transaction must serialize to JSON");
    let mut out = String::new();
    write_canonical(&value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, val)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(val, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Number(number) => write_number(number, out),
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Integral floats print without a fraction (`1.0` -> `1`, `-0.0` -> `0`), so
/// `1.0` and `1` produce the same leaf.
fn write_number(number: &Number, out: &mut String) {
    match number.as_f64() {
        Some(f) if number.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => {
            if f == 0.0 {
                out.push('0');
            } else {
                out.push_str(&format!("{:.0}", f));
            }
        }
        _ => out.push_str(&number.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn txs() -> Vec<Value> {
        vec![
            json!({"from": "alice", "to": "bob", "amount": 10}),
            json!({"from": "bob", "to": "carol", "amount": 5}),
            json!({"from": "carol", "to": "alice", "amount": 1}),
        ]
    }

    #[test]
    fn test_empty_root_is_digest_of_empty_string() {
        let empty: Vec<Value> = Vec::new();
        assert_eq!(
            merkle_root(&empty).to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_single_leaf_is_root() {
        let root = merkle_root(&txs()[..1]);
        assert_eq!(
            root.to_hex(),
            "0db4d974e3128ca9a80b7af67ea4c241a741392b77382a9848bc2a629c67d883"
        );
    }

    #[test]
    fn test_known_roots() {
        assert_eq!(
            merkle_root(&txs()[..2]).to_hex(),
            "7db7eb8b6f64405ba4210808a227650485227a84dd2882cfd0290cbf59584209"
        );
        assert_eq!(
            merkle_root(&txs()).to_hex(),
            "7f54941254c7b6c590f0674846063959bd9bff69e3b19e2fdfbb72d6fa4c9eb3"
        );
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(merkle_root(&txs()), merkle_root(&txs()));
    }

    #[test]
    fn test_order_sensitive() {
        let mut reversed = txs();
        reversed.reverse();
        assert_ne!(merkle_root(&txs()), merkle_root(&reversed));
    }

    #[test]
    fn test_odd_count_duplicates_last_node() {
        let items = txs();
        let leaves: Vec<Hash> = items
            .iter()
            .map(|tx| digest(canonical_json(tx).as_bytes()))
            .collect();

        let left = combine(&leaves[0], &leaves[1]);
        let duplicated = combine(&leaves[2], &leaves[2]);
        let wrapped = combine(&leaves[2], &leaves[0]);

        assert_eq!(merkle_root(&items), combine(&left, &duplicated));
        assert_ne!(merkle_root(&items), combine(&left, &wrapped));
    }

    #[test]
    fn test_canonical_json_ignores_key_order() {
        let a: Value = serde_json::from_str(r#"{"b":1,"a":{"y":2,"x":[3,{"q":1,"p":0}]}}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"a":{"x":[3,{"p":0,"q":1}],"y":2},"b":1}"#).unwrap();
        assert_eq!(canonical_json(&a), canonical_json(&b));
        assert_eq!(canonical_json(&a), r#"{"a":{"x":[3,{"p":0,"q":1}],"y":2},"b":1}"#);
        assert_eq!(merkle_root(&[a]), merkle_root(&[b]));
    }

    #[test]
    fn test_integral_floats_hash_like_integers() {
        let float = json!({"from": "alice", "to": "bob", "amount": 10.0});
        assert_eq!(canonical_json(&float), r#"{"amount":10,"from":"alice","to":"bob"}"#);
        assert_eq!(merkle_root(&[float]), merkle_root(&txs()[..1]));

        assert_eq!(canonical_json(&json!([-0.0, 2.5, -3.0])), "[0,2.5,-3]");
    }
}
