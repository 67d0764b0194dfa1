/// One cell of a query result.
///
/// Mirrors SQLite's storage classes. No coercion happens between variants:
/// `Integer(1)`, `Real(1.0)` and `Text("1")` are three different values.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// One result row; fields in the order the query returned them.
pub type Row = Vec<Value>;

impl Value {
    fn type_tag(&self) -> char {
        match self {
            Self::Null => '0',
            Self::Integer(_) => '1',
            Self::Real(_) => '2',
            Self::Text(_) => '3',
            Self::Blob(_) => '4',
        }
    }

    /// Type-tagged string encoding used for canonical ordering and identity.
    ///
    /// `0:` null, `1:<int>`, `2:<real as {:?}>`, `3:<text>`, `4:<hex>`. Two
    /// values are identical iff their keys are equal, so NaN matches NaN and
    /// `-0.0` differs from `0.0`.
    pub fn canonical_key(&self) -> String {
        let tag = self.type_tag();
        match self {
            Self::Null => format!("{tag}:"),
            Self::Integer(i) => format!("{tag}:{i}"),
            Self::Real(r) => format!("{tag}:{r:?}"),
            Self::Text(s) => format!("{tag}:{s}"),
            Self::Blob(bytes) => {
                let mut key = String::with_capacity(2 + bytes.len() * 2);
                key.push(tag);
                key.push(':');
                for b in bytes {
                    key.push_str(&format!("{b:02x}"));
                }
                key
            }
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Self::Real(r)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_type_tagged() {
        assert_eq!(Value::Null.canonical_key(), "0:");
        assert_eq!(Value::Integer(1).canonical_key(), "1:1");
        assert_eq!(Value::Real(1.0).canonical_key(), "2:1.0");
        assert_eq!(Value::from("1").canonical_key(), "3:1");
        assert_eq!(Value::Blob(vec![0x0a, 0xff]).canonical_key(), "4:0aff");
    }

    #[test]
    fn no_cross_type_collisions() {
        let keys = [
            Value::Integer(1).canonical_key(),
            Value::Real(1.0).canonical_key(),
            Value::from("1").canonical_key(),
            Value::Blob(vec![1]).canonical_key(),
        ];
        for (i, a) in keys.iter().enumerate() {
            for b in &keys[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn text_null_is_not_null() {
        assert_ne!(Value::from("").canonical_key(), Value::Null.canonical_key());
        assert_ne!(Value::from("NULL").canonical_key(), Value::Null.canonical_key());
    }

    #[test]
    fn option_maps_none_to_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(3i64)), Value::Integer(3));
    }

    #[test]
    fn untagged_json_shape() {
        let row: Row = serde_json::from_str(r#"[null, 3, 2.5, "x"]"#).unwrap();
        assert_eq!(
            row,
            vec![
                Value::Null,
                Value::Integer(3),
                Value::Real(2.5),
                Value::from("x")
            ]
        );
    }
}
