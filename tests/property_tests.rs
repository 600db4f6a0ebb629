//! Property tests for the binding laws.
//!
//! These tests check idempotence, required/default handling, numeric
//! boundaries and ordering over generated inputs.

use formbind::{bind_from_mapping, impl_bind, BindError, CoerceError, ValueMap};
use proptest::prelude::*;

#[derive(Default, Debug, Clone, PartialEq)]
struct Profile {
    name: String,
    age: u8,
    score: i64,
    ratio: f64,
    active: bool,
    tags: Vec<String>,
    nickname: Option<String>,
}

impl_bind!(Profile {
    name: r#"form:"name""#,
    age: r#"form:"age""#,
    score: r#"form:"score""#,
    ratio: r#"form:"ratio""#,
    active: r#"form:"active""#,
    tags: r#"form:"tag""#,
    nickname: r#"form:"nick""#,
});

#[derive(Default, Debug)]
struct RequiredId {
    id: i32,
}
impl_bind!(RequiredId { id: r#"form:"id" binding:"required""# });

#[derive(Default, Debug)]
struct DefaultedLimit {
    limit: u16,
}
impl_bind!(DefaultedLimit { limit: r#"form:"limit,default=25""# });

#[derive(Default, Debug)]
struct Tiny {
    value: i8,
}
impl_bind!(Tiny { value: r#"form:"value""# });

#[derive(Default, Debug)]
struct Ordered {
    items: Vec<i32>,
}
impl_bind!(Ordered { items: r#"form:"item""# });

// Strategy: a mapping for Profile with any subset of keys present
fn arb_profile_input() -> impl Strategy<Value = ValueMap> {
    (
        prop::option::of("[a-z]{0,8}"),
        prop::option::of(any::<u8>()),
        prop::option::of(any::<i64>()),
        prop::option::of(-1.0e6f64..1.0e6),
        prop::option::of(prop_oneof![Just("true"), Just("0"), Just("T"), Just("f")]),
        prop::collection::vec("[a-z]{1,5}", 0..4),
        prop::option::of("[a-z]{1,6}"),
    )
        .prop_map(|(name, age, score, ratio, active, tags, nick)| {
            let mut map = ValueMap::new();
            if let Some(name) = name {
                map.insert("name", name);
            }
            if let Some(age) = age {
                map.insert("age", age.to_string());
            }
            if let Some(score) = score {
                map.insert("score", score.to_string());
            }
            if let Some(ratio) = ratio {
                map.insert("ratio", ratio.to_string());
            }
            if let Some(active) = active {
                map.insert("active", active);
            }
            for tag in tags {
                map.insert("tag", tag);
            }
            if let Some(nick) = nick {
                map.insert("nick", nick);
            }
            map
        })
}

proptest! {
    /// Property: binding the same mapping twice gives equal structures
    #[test]
    fn proptest_binding_is_idempotent(input in arb_profile_input()) {
        let mut first = Profile::default();
        let mut second = Profile::default();
        bind_from_mapping(&input, &mut first).unwrap();
        bind_from_mapping(&input, &mut second).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Property: a required key is missing exactly when it is omitted
    #[test]
    fn proptest_required_field_law(value in prop::option::of(any::<i32>()), noise in "[a-z]{1,4}") {
        let mut input = ValueMap::new();
        input.insert("other", noise);
        if let Some(v) = value {
            input.insert("id", v.to_string());
        }

        let mut target = RequiredId::default();
        let result = bind_from_mapping(&input, &mut target);
        match value {
            Some(v) => {
                prop_assert!(result.is_ok());
                prop_assert_eq!(target.id, v);
            }
            None => {
                let is_missing = matches!(result, Err(BindError::MissingRequiredField { .. }));
                prop_assert!(is_missing);
            }
        }
    }

    /// Property: an absent or empty key takes the default, any other value wins
    #[test]
    fn proptest_default_substitution(supplied in prop::option::of(prop_oneof![Just(String::new()), any::<u16>().prop_map(|v| v.to_string())])) {
        let mut input = ValueMap::new();
        if let Some(s) = &supplied {
            input.insert("limit", s.clone());
        }

        let mut target = DefaultedLimit::default();
        bind_from_mapping(&input, &mut target).unwrap();
        let expected = match supplied.as_deref() {
            None | Some("") => 25u16,
            Some(s) => s.parse::<u16>().unwrap(),
        };
        prop_assert_eq!(target.limit, expected);
    }

    /// Property: i8 accepts exactly the values in its range
    #[test]
    fn proptest_numeric_boundary(n in -1000i64..1000) {
        let input: ValueMap = [("value", n.to_string())].into_iter().collect();
        let mut target = Tiny::default();
        let result = bind_from_mapping(&input, &mut target);

        if (i8::MIN as i64..=i8::MAX as i64).contains(&n) {
            prop_assert!(result.is_ok());
            prop_assert_eq!(target.value as i64, n);
        } else {
            let overflowed = matches!(result, Err(BindError::TypeCoercionFailed { cause: CoerceError::Int(_), .. }));
            prop_assert!(overflowed);
        }
    }

    /// Property: repeated values land in the sequence in input order
    #[test]
    fn proptest_sequence_keeps_order(values in prop::collection::vec(any::<i32>(), 1..10)) {
        let mut input = ValueMap::new();
        for v in &values {
            input.insert("item", v.to_string());
        }

        let mut target = Ordered::default();
        bind_from_mapping(&input, &mut target).unwrap();
        prop_assert_eq!(target.items, values);
    }
}

#[test]
fn i8_edges() {
    for (raw, ok) in [("127", true), ("-128", true), ("128", false), ("-129", false)] {
        let input: ValueMap = [("value", raw)].into_iter().collect();
        assert_eq!(bind_from_mapping(&input, &mut Tiny::default()).is_ok(), ok, "{raw}");
    }
}
