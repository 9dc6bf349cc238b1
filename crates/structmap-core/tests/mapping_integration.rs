//! Integration tests for encoding and decoding between differently shaped records


use serde::{Deserialize, Serialize};
use serde_json::json;
use structmap_core::{Error, Mapped, Mapper, MapperOptions, PER_TYPE_PATH_NOT_VALID};
use test_support::*;

#[test]
fn test_unmarshal_foreign_object() {
    let src = populated_api_object();
    let mut dst = SystemStruct::default();

    structmap_core::unmarshal(&src, &mut dst).unwrap();

    assert_eq!(dst.name, "test");
    assert_eq!(dst.count, 999);
    assert!(dst.flag);
    assert_eq!(dst.nested.direction, "up");
    assert_eq!(dst.nested.deep_nested.direction, "up");
    assert_eq!(dst.listed_stuff, vec!["a", "b", "c"]);
}

#[test]
fn test_marshal_into_foreign_object() {
    let src = populated_system_struct();
    let mut dst = ApiObject::default();

    structmap_core::marshal(&src, &mut dst).unwrap();

    assert_eq!(dst.metadata.namefield, "test");
    assert!(dst.metadata.flag);
    assert_eq!(dst.config.somecount, 999);
    assert_eq!(dst.config.somelist.len(), 1);
    assert_eq!(dst.config.somelist[0].config.direction, "up");
    assert_eq!(dst.config.somelist[0].list, vec!["a", "b", "c"]);
    assert_eq!(dst.config.somelist[0].config.deepnested.direction2, "");
}

#[test]
fn test_decode_from_plain_tree() {
    let tree = json!({
        "metadata": {"namefield": "test", "flag": true},
        "config": {
            "somecount": 999,
            "somelist": [{"list": ["a", "b", "c"], "config": {"direction": "up"}}]
        }
    });
    let mut dst = SystemStruct::default();

    structmap_core::decode_from_value(tree, &mut dst, "ApiObject").unwrap();

    assert_eq!(dst, populated_system_struct());
}

#[test]
fn test_round_trip_through_foreign_object() {
    let mut original = populated_system_struct();
    original.nested.deep_nested.direction = "down".to_string();

    let mut foreign = ApiObject::default();
    structmap_core::encode(&original, &mut foreign).unwrap();
    let mut back = SystemStruct::default();
    structmap_core::decode(&foreign, &mut back).unwrap();

    assert_eq!(back, original);
}

#[test]
fn test_untagged_fields_are_ignored() {
    #[derive(Mapped, Serialize, Deserialize, Debug, Default)]
    #[serde(default)]
    struct Partial {
        #[sm("metadata.namefield")]
        name: String,
        count: i64,
    }

    let src = Partial {
        name: "test".to_string(),
        count: 5,
    };
    let tree = structmap_core::encode_to_value(&src, "ApiObject").unwrap();
    assert_eq!(tree, json!({"metadata": {"namefield": "test"}}));

    let mut dst = Partial {
        count: 7,
        ..Default::default()
    };
    structmap_core::decode(&populated_api_object(), &mut dst).unwrap();
    assert_eq!(dst.name, "test");
    assert_eq!(dst.count, 7);
}

#[test]
fn test_omit_empty_keeps_destination_values() {
    let src = SystemStruct {
        name: "test".to_string(),
        ..Default::default()
    };
    let mut dst = populated_api_object();

    structmap_core::encode(&src, &mut dst).unwrap();

    assert_eq!(dst.metadata.namefield, "test");
    assert_eq!(dst.config.somecount, 999);
    assert!(dst.metadata.flag);
}

#[test]
fn test_zero_values_written_without_omit_empty() {
    let src = SystemStruct::default();
    let mapper = Mapper::new(MapperOptions::default().with_omit_empty(false));

    let tree = mapper.encode_to_value(&src, "ApiObject").unwrap();

    assert_eq!(tree["config"]["somecount"], json!(0));
    assert_eq!(tree["metadata"]["flag"], json!(false));
    assert_eq!(tree["config"]["somelist"][0]["list"], json!([]));
}

#[test]
fn test_sparse_index_fills_with_empty_maps() {
    #[derive(Mapped, Serialize, Default)]
    struct Third {
        #[sm("items[2].name")]
        name: String,
    }

    let src = Third {
        name: "third".to_string(),
    };
    let tree = structmap_core::encode_to_value(&src, "Anything").unwrap();

    assert_eq!(tree, json!({"items": [{}, {}, {"name": "third"}]}));
}

#[test]
fn test_sequence_of_records() {
    #[derive(Mapped, Serialize, Deserialize, Debug, Default, PartialEq)]
    #[serde(default)]
    struct Port {
        #[sm("containerPort")]
        number: u16,
        #[sm("protocol")]
        protocol: String,
    }

    #[derive(Mapped, Serialize, Deserialize, Debug, Default, PartialEq)]
    #[serde(default)]
    struct Service {
        #[sm("spec.ports")]
        ports: Vec<Port>,
    }

    let src = Service {
        ports: vec![
            Port {
                number: 80,
                protocol: "TCP".to_string(),
            },
            Port {
                number: 53,
                protocol: "UDP".to_string(),
            },
        ],
    };

    let tree = structmap_core::encode_to_value(&src, "Pod").unwrap();
    assert_eq!(
        tree,
        json!({"spec": {"ports": [
            {"containerPort": 80, "protocol": "TCP"},
            {"containerPort": 53, "protocol": "UDP"}
        ]}})
    );

    let mut back = Service::default();
    structmap_core::decode_from_value(tree, &mut back, "Pod").unwrap();
    assert_eq!(back, src);
}

#[test]
fn test_optional_record_absent_from_source() {
    #[derive(Mapped, Serialize, Deserialize, Debug, Default, PartialEq)]
    #[serde(default)]
    struct Limits {
        #[sm("cpu")]
        cpu: String,
    }

    #[derive(Mapped, Serialize, Deserialize, Debug, Default, PartialEq)]
    #[serde(default)]
    struct Container {
        #[sm("name")]
        name: String,
        #[sm("resources.limits")]
        limits: Option<Limits>,
    }

    let mut dst = Container::default();
    structmap_core::decode_from_value(json!({"name": "app"}), &mut dst, "Pod").unwrap();
    assert_eq!(dst.name, "app");
    assert_eq!(dst.limits, None);

    structmap_core::decode_from_value(
        json!({"name": "app", "resources": {"limits": {"cpu": "500m"}}}),
        &mut dst,
        "Pod",
    )
    .unwrap();
    assert_eq!(
        dst.limits,
        Some(Limits {
            cpu: "500m".to_string()
        })
    );
}

#[test]
fn test_decode_into_renamed_destination() {
    #[derive(Mapped, Serialize, Deserialize, Debug, Default, PartialEq)]
    #[serde(default, rename_all = "PascalCase")]
    struct PascalNested {
        #[sm("direction")]
        direction: String,
    }

    #[derive(Mapped, Serialize, Deserialize, Debug, Default, PartialEq)]
    #[serde(default, rename_all = "PascalCase")]
    struct Pascal {
        #[sm("metadata.namefield")]
        name: String,
        #[sm("config.somelist[0].config")]
        nested_config: PascalNested,
        #[sm("config.somecount")]
        #[serde(rename = "total")]
        count: i64,
    }

    let mut dst = Pascal::default();
    structmap_core::decode(&populated_api_object(), &mut dst).unwrap();

    assert_eq!(
        dst,
        Pascal {
            name: "test".to_string(),
            nested_config: PascalNested {
                direction: "up".to_string(),
            },
            count: 999,
        }
    );
}

#[test]
fn test_encode_into_destination_with_other_key_case() {
    #[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
    #[serde(default, rename_all = "PascalCase")]
    struct UpperMetadata {
        namefield: String,
        flag: bool,
    }

    #[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
    #[serde(default, rename_all = "PascalCase")]
    struct UpperObject {
        metadata: UpperMetadata,
    }

    let mut dst = UpperObject::default();
    structmap_core::encode(&populated_system_struct(), &mut dst).unwrap();

    assert_eq!(dst.metadata.namefield, "test");
    assert!(dst.metadata.flag);
}

#[test]
fn test_path_conflict_is_reported() {
    #[derive(Mapped, Serialize, Default)]
    struct Clash {
        #[sm("spec")]
        scalar: String,
        #[sm("spec.replicas")]
        replicas: i64,
    }

    let src = Clash {
        scalar: "flat".to_string(),
        replicas: 2,
    };
    let err = structmap_core::encode_to_value(&src, "Deployment").unwrap_err();
    assert!(matches!(err, Error::PathConflict { .. }));
}

#[test]
fn test_malformed_annotation_is_reported() {
    #[derive(Mapped, Serialize, Default)]
    struct Broken {
        #[sm("items[first].name")]
        name: String,
    }

    let err = structmap_core::encode_to_value(&Broken::default(), "Anything").unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidPath { .. } | Error::InvalidAnnotation { .. }
    ));

    // parse failures are not cached, the same call fails the same way
    let again = structmap_core::encode_to_value(&Broken::default(), "Anything").unwrap_err();
    assert_eq!(again.to_string(), err.to_string());
}

#[test]
fn test_self_referencing_record_hits_depth_limit() {
    #[derive(Mapped, Serialize, Default)]
    struct Chain {
        #[sm("value")]
        value: i64,
        #[sm("next")]
        next: Option<Box<Chain>>,
    }

    let mut chain = Chain {
        value: 1,
        next: None,
    };
    for value in 2..6 {
        chain = Chain {
            value,
            next: Some(Box::new(chain)),
        };
    }

    let shallow = Mapper::new(MapperOptions::default().with_max_depth(2));
    let err = shallow.encode_to_value(&chain, "Chain").unwrap_err();
    assert!(matches!(err, Error::DepthExceeded { limit: 2, .. }));

    let tree = Mapper::default().encode_to_value(&chain, "Chain").unwrap();
    assert_eq!(tree["next"]["next"]["next"]["next"]["value"], json!(1));
}

#[test]
fn test_self_referencing_record_decodes_to_source_depth() {
    #[derive(Mapped, Serialize, Deserialize, Debug, Default, PartialEq)]
    #[serde(default)]
    struct Chain {
        #[sm("value")]
        value: i64,
        #[sm("next")]
        next: Option<Box<Chain>>,
    }

    let mut dst = Chain::default();
    structmap_core::decode_from_value(json!({"value": 1}), &mut dst, "Chain").unwrap();
    assert_eq!(dst, Chain { value: 1, next: None });

    structmap_core::decode_from_value(
        json!({"value": 1, "next": {"value": 2, "next": {"value": 3}}}),
        &mut dst,
        "Chain",
    )
    .unwrap();
    assert_eq!(dst.next.as_ref().map(|n| n.value), Some(2));
    assert_eq!(
        dst.next.as_ref().and_then(|n| n.next.as_ref()).map(|n| n.value),
        Some(3)
    );

    let shallow = Mapper::new(MapperOptions::default().with_max_depth(1));
    let err = shallow
        .decode_from_value(
            json!({"value": 1, "next": {"value": 2, "next": {"value": 3}}}),
            &mut Chain::default(),
            "Chain",
        )
        .unwrap_err();
    assert!(matches!(err, Error::DepthExceeded { limit: 1, .. }));
}

#[test]
fn test_per_type_path_requires_multi_type_marker() {
    #[derive(Mapped, Serialize, Deserialize, Default)]
    #[serde(default)]
    struct Misdeclared {
        #[sm("metadata.flag,types<ApiObject:metadata.flag|SecondaryApiObject:configflag>")]
        flag: bool,
    }

    let src = Misdeclared { flag: true };
    let mut dst = ApiObject::default();
    let err = structmap_core::encode(&src, &mut dst).unwrap_err();

    match err {
        Error::Configuration { message, field } => {
            assert_eq!(message, PER_TYPE_PATH_NOT_VALID);
            assert_eq!(field.as_deref(), Some("flag"));
        }
        other => panic!("unexpected error: {other}"),
    }

    // the same tag fails the opposite direction too
    let mut back = Misdeclared::default();
    let err = structmap_core::decode(&populated_api_object(), &mut back).unwrap_err();
    match err {
        Error::Configuration { message, field } => {
            assert_eq!(message, PER_TYPE_PATH_NOT_VALID);
            assert_eq!(field.as_deref(), Some("flag"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!back.flag);
}
