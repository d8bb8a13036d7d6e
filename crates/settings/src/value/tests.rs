use super::TaggedValue;

#[test]
fn null_is_the_default_and_coerces_to_nothing() {
	let value = TaggedValue::default();
	assert!(value.is_null());
	assert_eq!(value.to_int(), None);
	assert_eq!(value.to_bool(), None);
	assert_eq!(value.to_text(), None);
	assert_eq!(value.to_bytes(), None);
}

#[test]
fn text_coerces_to_numbers_and_flags() {
	assert_eq!(TaggedValue::from("42").to_int(), Some(42));
	assert_eq!(TaggedValue::from(" TRUE ").to_bool(), Some(true));
	assert_eq!(TaggedValue::from("0").to_bool(), Some(false));
	assert_eq!(TaggedValue::from("maybe").to_bool(), None);
}

#[test]
fn int_and_bool_cross_coerce() {
	assert_eq!(TaggedValue::Int(0).to_bool(), Some(false));
	assert_eq!(TaggedValue::Int(-3).to_bool(), Some(true));
	assert_eq!(TaggedValue::Bool(true).to_int(), Some(1));
	assert_eq!(TaggedValue::Int(7).to_text().as_deref(), Some("7"));
}

#[test]
fn bytes_serialize_as_base64_inline_table() {
	#[derive(serde::Serialize, serde::Deserialize)]
	struct Doc {
		blob: TaggedValue,
	}

	let doc = Doc {
		blob: TaggedValue::Bytes(vec![0, 159, 146, 150]),
	};
	let text = toml::to_string(&doc).expect("serialize");
	assert!(text.contains("AJ+Slg=="), "{text}");

	let back: Doc = toml::from_str(&text).expect("deserialize");
	assert_eq!(back.blob, TaggedValue::Bytes(vec![0, 159, 146, 150]));
}
