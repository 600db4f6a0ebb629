use formbind::{
    bind_from_mapping, impl_bind, BindError, Binder, CoerceError, HttpMethod, Kind, PathParams,
    RawRequest, Timestamp, ValueMap, MIME_MULTIPART_POST_FORM, MIME_POST_FORM,
};
use std::collections::HashMap;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

#[derive(Default, Debug, PartialEq)]
struct FooStruct {
    foo: String,
}
impl_bind!(FooStruct {
    foo: r#"json:"foo" form:"foo" xml:"foo" binding:"required""#
});

#[derive(Default, Debug, PartialEq)]
struct FooBarStruct {
    inner: FooStruct,
    bar: String,
}
impl_bind!(FooBarStruct {
    inner: "",
    bar: r#"json:"bar" form:"bar" xml:"bar" binding:"required""#,
});

#[derive(Default, Debug)]
struct FooDefaultBarStruct {
    inner: FooStruct,
    bar: String,
}
impl_bind!(FooDefaultBarStruct {
    inner: "",
    bar: r#"json:"bar" form:"bar,default=hello" xml:"bar" binding:"required""#,
});

#[derive(Default)]
struct TimeStruct {
    time_foo: Timestamp,
    time_bar: Timestamp,
}
impl_bind!(TimeStruct {
    time_foo: r#"form:"time_foo" time_format:"2006-01-02" time_utc:"1" time_location:"Asia/Chongqing""#,
    time_bar: r#"form:"time_bar" time_format:"2006-01-02" time_utc:"1""#,
});

#[derive(Default)]
struct TimeNoFormat {
    time_foo: Timestamp,
}
impl_bind!(TimeNoFormat { time_foo: r#"form:"time_foo""# });

#[derive(Default)]
struct TimeBadFormat {
    time_foo: Timestamp,
}
impl_bind!(TimeBadFormat {
    time_foo: r#"form:"time_foo" time_format:"2017-11-15""#
});

#[derive(Default)]
struct TimeBadLocation {
    time_foo: Timestamp,
}
impl_bind!(TimeBadLocation {
    time_foo: r#"form:"time_foo" time_format:"2006-01-02" time_location:"/asia/chongqing""#
});

#[derive(Default)]
struct MapStruct {
    map_foo: HashMap<String, String>,
}
impl_bind!(MapStruct { map_foo: r#"form:"map_foo""# });

#[derive(Default)]
struct InvalidName {
    test_name: String,
}
impl_bind!(InvalidName { test_name: r#"invalid_name:"test_name""# });

#[derive(Default)]
struct InvalidNameMapInner {
    map_foo: HashMap<String, String>,
}
impl_bind!(InvalidNameMapInner { map_foo: r#"form:"map_foo""# });

#[derive(Default)]
struct InvalidNameMap {
    test_name: InvalidNameMapInner,
}
impl_bind!(InvalidNameMap { test_name: "" });

#[derive(Default)]
struct BoolStruct {
    bool_foo: bool,
}
impl_bind!(BoolStruct { bool_foo: r#"form:"bool_foo""# });

fn form_post(url: &str, body: &str) -> RawRequest {
    RawRequest::new(HttpMethod::Post, url).with_body(MIME_POST_FORM, body)
}

fn multipart(url: &str, fields: &[(&str, &str)]) -> RawRequest {
    let boundary = "--testboundary";
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{boundary}--\r\n"));
    RawRequest::new(HttpMethod::Post, url).with_body(
        format!("{}; boundary={}", MIME_MULTIPART_POST_FORM, boundary),
        body,
    )
}

#[test]
fn form_binding_reads_post_body() {
    init_tracing();
    let mut obj = FooBarStruct::default();
    Binder::default()
        .bind("form", &form_post("/", "foo=bar&bar=foo"), &mut obj)
        .unwrap();
    assert_eq!(obj.inner.foo, "bar");
    assert_eq!(obj.bar, "foo");
}

#[test]
fn form_binding_reads_query_on_get() {
    let mut obj = FooBarStruct::default();
    let request = RawRequest::new(HttpMethod::Get, "/?foo=bar&bar=foo");
    Binder::default().bind("form", &request, &mut obj).unwrap();
    assert_eq!(obj.inner.foo, "bar");
    assert_eq!(obj.bar, "foo");
}

#[test]
fn form_binding_default_value() {
    let binder = Binder::default();
    for request in [
        form_post("/", "foo=bar"),
        RawRequest::new(HttpMethod::Get, "/?foo=bar"),
    ] {
        let mut obj = FooDefaultBarStruct::default();
        binder.bind("form", &request, &mut obj).unwrap();
        assert_eq!(obj.inner.foo, "bar");
        assert_eq!(obj.bar, "hello");
    }
}

#[test]
fn form_binding_time() {
    let binder = Binder::default();
    for request in [
        form_post("/", "time_foo=2017-11-15&time_bar="),
        RawRequest::new(HttpMethod::Get, "/?time_foo=2017-11-15&time_bar="),
    ] {
        let mut obj = TimeStruct::default();
        binder.bind("form", &request, &mut obj).unwrap();
        assert_eq!(obj.time_foo.unix(), 1_510_675_200);
        assert_eq!(obj.time_foo.zone_name(), "Asia/Chongqing");
        assert_eq!(obj.time_bar, Timestamp::default());
        assert_eq!(obj.time_bar.zone_name(), "UTC");
    }
}

#[test]
fn form_binding_time_failures() {
    let binder = Binder::default();
    let request = form_post("/", "time_foo=2017-11-15");

    let err = binder
        .bind("form", &request, &mut TimeNoFormat::default())
        .unwrap_err();
    assert!(matches!(err, BindError::InvalidTimeConfiguration { .. }));

    let err = binder
        .bind("form", &request, &mut TimeBadFormat::default())
        .unwrap_err();
    assert!(matches!(
        err,
        BindError::TypeCoercionFailed {
            target: Kind::Time,
            cause: CoerceError::Time(_),
            ..
        }
    ));

    let err = binder
        .bind("form", &request, &mut TimeBadLocation::default())
        .unwrap_err();
    assert!(matches!(err, BindError::InvalidTimeConfiguration { ref reason, .. } if reason.contains("/asia/chongqing")));
}

#[test]
fn form_binding_invalid_name() {
    let binder = Binder::default();
    let request = form_post("/", "test_name=bar");

    let mut obj = InvalidName::default();
    binder.bind("form", &request, &mut obj).unwrap();
    assert_eq!(obj.test_name, "");

    let err = binder
        .bind("form", &request, &mut InvalidNameMap::default())
        .unwrap_err();
    assert_eq!(
        err,
        BindError::UnsupportedFieldType {
            field: "test_name.map_foo".to_string(),
            kind: Kind::UnorderedMap,
        }
    );
}

#[test]
fn form_binding_missing_required() {
    let err = Binder::default()
        .bind("form", &RawRequest::new(HttpMethod::Post, "/"), &mut FooBarStruct::default())
        .unwrap_err();
    assert_eq!(
        err,
        BindError::MissingRequiredField {
            field: "inner.foo".to_string(),
            key: "foo".to_string(),
        }
    );
    assert_eq!(err.to_string(), "missing required field 'inner.foo' (key 'foo')");
}

#[test]
fn query_binding_ignores_body() {
    let binder = Binder::default();
    for method in [HttpMethod::Post, HttpMethod::Get] {
        let request =
            RawRequest::new(method, "/?foo=bar&bar=foo").with_body(MIME_POST_FORM, "foo=unused");
        let mut obj = FooBarStruct::default();
        binder.bind("query", &request, &mut obj).unwrap();
        assert_eq!(obj.inner.foo, "bar");
        assert_eq!(obj.bar, "foo");
    }
}

#[test]
fn query_binding_rejects_maps_and_bad_bools() {
    let binder = Binder::default();
    let request = RawRequest::new(HttpMethod::Get, "/?map_foo=");
    assert!(binder.bind("query", &request, &mut MapStruct::default()).is_err());

    let request = RawRequest::new(HttpMethod::Get, "/?bool_foo=fasl");
    let err = binder
        .bind("query", &request, &mut BoolStruct::default())
        .unwrap_err();
    match err {
        BindError::TypeCoercionFailed {
            field,
            key,
            raw,
            target,
            cause,
        } => {
            assert_eq!(field, "bool_foo");
            assert_eq!(key, "bool_foo");
            assert_eq!(raw, "fasl");
            assert_eq!(target, Kind::Bool);
            assert_eq!(cause, CoerceError::Bool);
        }
        other => panic!("unexpected error {other:?}"),
    }

    for upper in ["TRUE", "True", "FALSE", "False"] {
        let request = RawRequest::new(HttpMethod::Get, &format!("/?bool_foo={upper}"));
        let err = binder
            .bind("query", &request, &mut BoolStruct::default())
            .unwrap_err();
        assert!(
            matches!(err, BindError::TypeCoercionFailed { cause: CoerceError::Bool, .. }),
            "{upper}"
        );
    }
}

#[test]
fn form_post_binding() {
    let binder = Binder::default();
    let mut obj = FooBarStruct::default();
    binder
        .bind(
            "form-urlencoded",
            &form_post("/?foo=getfoo&bar=getbar", "foo=bar&bar=foo"),
            &mut obj,
        )
        .unwrap();
    assert_eq!(obj.inner.foo, "bar");
    assert_eq!(obj.bar, "foo");

    let mut obj = FooDefaultBarStruct::default();
    binder
        .bind("form-urlencoded", &form_post("/?foo=getfoo&bar=getbar", "foo=bar"), &mut obj)
        .unwrap();
    assert_eq!(obj.inner.foo, "bar");
    assert_eq!(obj.bar, "hello");

    let request = form_post("/?map_foo=getfoo", "map_foo=bar");
    assert!(binder.bind("form-urlencoded", &request, &mut MapStruct::default()).is_err());

    let request = RawRequest::new(HttpMethod::Post, "/");
    assert!(binder.bind("form-urlencoded", &request, &mut FooBarStruct::default()).is_err());
}

#[test]
fn multipart_binding() {
    let binder = Binder::default();
    let mut obj = FooBarStruct::default();
    binder
        .bind(
            "multipart/form-data",
            &multipart("/?foo=getfoo&bar=getbar", &[("foo", "bar"), ("bar", "foo")]),
            &mut obj,
        )
        .unwrap();
    assert_eq!(obj.inner.foo, "bar");
    assert_eq!(obj.bar, "foo");

    let request = multipart("/?map_foo=getfoo", &[("map_foo", "bar")]);
    assert!(binder.bind("multipart/form-data", &request, &mut MapStruct::default()).is_err());

    let request = RawRequest::new(HttpMethod::Post, "/");
    let err = binder
        .bind("multipart/form-data", &request, &mut FooBarStruct::default())
        .unwrap_err();
    assert!(matches!(err, BindError::MalformedBody { .. }));
}

#[test]
fn form_binding_selects_multipart_body() {
    let request = multipart("/", &[("foo", "bar"), ("bar", "foo")]);
    let mut obj = FooBarStruct::default();
    Binder::default().bind_request(&request, &mut obj).unwrap();
    assert_eq!(obj.inner.foo, "bar");
    assert_eq!(obj.bar, "foo");
}

#[test]
fn uri_binding() {
    #[derive(Default)]
    struct Tag {
        name: String,
    }
    impl_bind!(Tag { name: r#"uri:"name""# });

    #[derive(Default)]
    struct NotSupported {
        name: HashMap<String, String>,
    }
    impl_bind!(NotSupported { name: r#"uri:"name""# });

    let binder = Binder::default();
    let params: PathParams = [("name", "thinkerou")].into_iter().collect();

    let mut tag = Tag::default();
    binder.bind_path(&params, &mut tag).unwrap();
    assert_eq!(tag.name, "thinkerou");

    let mut not = NotSupported::default();
    assert!(binder.bind_path(&params, &mut not).is_err());
    assert!(not.name.is_empty());

    let mut request = RawRequest::new(HttpMethod::Get, "/users/thinkerou");
    request.set_path_params(
        formbind::extract_path_params("/users/:name", request.url()).unwrap(),
    );
    let mut tag = Tag::default();
    binder.bind("uri", &request, &mut tag).unwrap();
    assert_eq!(tag.name, "thinkerou");
}

#[test]
fn unexported_field_is_left_alone() {
    #[derive(Default)]
    struct Hidden {
        visible: String,
        secret: String,
    }
    impl_bind!(Hidden {
        visible: r#"form:"visible""#,
        #[unexported] secret: r#"form:"secret""#,
    });

    let input: ValueMap = [("visible", "v"), ("secret", "s")].into_iter().collect();
    let mut obj = Hidden::default();
    bind_from_mapping(&input, &mut obj).unwrap();
    assert_eq!(obj.visible, "v");
    assert_eq!(obj.secret, "");
}

#[test]
fn nested_optional_pointers_are_allocated() {
    #[derive(Default)]
    struct Deep {
        value: Option<Option<Box<i16>>>,
        list: Option<Vec<u32>>,
    }
    impl_bind!(Deep {
        value: r#"form:"value""#,
        list: r#"form:"list""#,
    });

    let input: ValueMap = [("value", "-7"), ("list", "3"), ("list", "1"), ("list", "2")]
        .into_iter()
        .collect();
    let mut obj = Deep::default();
    bind_from_mapping(&input, &mut obj).unwrap();
    assert_eq!(obj.value, Some(Some(Box::new(-7))));
    assert_eq!(obj.list, Some(vec![3, 1, 2]));
}
