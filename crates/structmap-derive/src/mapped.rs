use proc_macro2::{Ident, TokenStream};
use proc_macro_error::abort;
use quote::quote;
use syn::ext::IdentExt;
use syn::parse::ParseStream;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{
    Attribute, DataStruct, Expr, Fields, GenericArgument, Lit, LitStr, Meta, PathArguments, Token,
    Type,
};

const TAG_KEY: &str = "sm";

/// How a field takes part in the mapping
enum Class {
    Value,
    Record {
        inner: Type,
        optional: bool,
        boxed: bool,
    },
    Records {
        inner: Type,
        optional: bool,
        boxed: bool,
    },
}

struct Tag {
    raw: LitStr,
    opaque: bool,
}

pub fn process_struct(ident: &Ident, attrs: &[Attribute], ds: DataStruct) -> TokenStream {
    let rename_rule = serde_rename_all(attrs);

    let fields = match ds.fields {
        Fields::Named(named) => named.named,
        _ => abort!(
            ds.struct_token.span(),
            "Only structs with named fields are supported"
        ),
    };

    let mut shapes = Vec::new();
    let mut values = Vec::new();
    for f in fields {
        let Some(tag) = parse_tag(&f.attrs) else {
            continue;
        };
        let field_ident = match &f.ident {
            Some(ident) => ident.clone(),
            None => abort!(f.span(), "Only named fields are supported"),
        };
        let name = serde_rename(&f.attrs).unwrap_or_else(|| {
            let plain = field_ident.unraw().to_string();
            match &rename_rule {
                Some(rule) => apply_rename_rule(rule, &plain),
                None => plain,
            }
        });
        let raw = &tag.raw;

        let class = if tag.opaque {
            Class::Value
        } else {
            classify(&f.ty)
        };

        let kind = match &class {
            Class::Value => quote!(::structmap_core::FieldKind::Value),
            Class::Record {
                inner, optional, ..
            } => quote!(::structmap_core::FieldKind::Record {
                shape: <#inner as ::structmap_core::Mapped>::record_shape,
                optional: #optional,
            }),
            Class::Records { inner, .. } => quote!(::structmap_core::FieldKind::Records {
                shape: <#inner as ::structmap_core::Mapped>::record_shape,
            }),
        };
        shapes.push(quote!(::structmap_core::FieldShape {
            name: #name,
            tag: #raw,
            kind: #kind,
        }));

        values.push(field_value(&field_ident, &class));
    }

    let ident_str = ident.to_string();
    quote!(
        impl ::structmap_core::Record for #ident {
            fn shape(&self) -> &'static ::structmap_core::Shape {
                <Self as ::structmap_core::Mapped>::record_shape()
            }

            fn values(&self) -> ::std::vec::Vec<::structmap_core::FieldValue<'_>> {
                ::std::vec![#(#values),*]
            }
        }

        impl ::structmap_core::Mapped for #ident {
            fn record_shape() -> &'static ::structmap_core::Shape {
                static SHAPE: ::structmap_core::Shape = ::structmap_core::Shape {
                    type_name: #ident_str,
                    fields: &[#(#shapes),*],
                };
                &SHAPE
            }
        }
    )
}

fn field_value(field: &Ident, class: &Class) -> TokenStream {
    let as_record = quote!(as &dyn ::structmap_core::Record);
    match class {
        Class::Value => quote!(::structmap_core::FieldValue::Value(&self.#field)),
        Class::Record {
            optional, boxed, ..
        } => {
            let access = match (optional, boxed) {
                (false, false) => quote!(::std::option::Option::Some(&self.#field #as_record)),
                (false, true) => quote!(::std::option::Option::Some(&*self.#field #as_record)),
                (true, false) => quote!(self.#field.as_ref().map(|v| v #as_record)),
                (true, true) => quote!(self.#field.as_deref().map(|v| v #as_record)),
            };
            quote!(::structmap_core::FieldValue::Record(#access))
        }
        Class::Records {
            optional, boxed, ..
        } => {
            let items = if *optional {
                quote!(self.#field.iter().flatten())
            } else {
                quote!(self.#field.iter())
            };
            let element = if *boxed {
                quote!(|v| &**v #as_record)
            } else {
                quote!(|v| v #as_record)
            };
            quote!(::structmap_core::FieldValue::Records(#items.map(#element).collect()))
        }
    }
}

fn parse_tag(attrs: &[Attribute]) -> Option<Tag> {
    let mut found: Option<Tag> = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident(TAG_KEY)) {
        if found.is_some() {
            abort!(attr.span(), "Duplicate #[sm] attribute");
        }
        let parsed = attr.parse_args_with(|input: ParseStream| {
            let raw: LitStr = input.parse()?;
            let mut opaque = false;
            while input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
                if input.is_empty() {
                    break;
                }
                let flag: Ident = input.parse()?;
                if flag != "opaque" {
                    return Err(syn::Error::new(flag.span(), "expected `opaque`"));
                }
                opaque = true;
            }
            Ok(Tag { raw, opaque })
        });
        match parsed {
            Ok(tag) if tag.raw.value().is_empty() => {
                abort!(tag.raw.span(), "Annotation path can not be empty")
            }
            Ok(tag) => found = Some(tag),
            Err(err) => abort!(err.span(), "{}", err),
        }
    }
    found
}

/// Field-level `#[serde(rename = "...")]`, the deserialize name when split
fn serde_rename(attrs: &[Attribute]) -> Option<String> {
    let mut rename = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        let Ok(metas) = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated) else {
            continue;
        };
        for meta in metas {
            match meta {
                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    if let Some(name) = str_lit(&nv.value) {
                        rename = Some(name);
                    }
                }
                Meta::List(list) if list.path.is_ident("rename") => {
                    let Ok(inner) =
                        list.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)
                    else {
                        continue;
                    };
                    for meta in inner {
                        if let Meta::NameValue(nv) = meta {
                            if nv.path.is_ident("deserialize") {
                                rename = str_lit(&nv.value).or(rename);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }
    rename
}

/// Container-level `#[serde(rename_all = "...")]`, the deserialize rule when split
fn serde_rename_all(attrs: &[Attribute]) -> Option<String> {
    let mut rule = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        let Ok(metas) = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated) else {
            continue;
        };
        for meta in metas {
            match meta {
                Meta::NameValue(nv) if nv.path.is_ident("rename_all") => {
                    if let Some(name) = str_lit(&nv.value) {
                        rule = Some(name);
                    }
                }
                Meta::List(list) if list.path.is_ident("rename_all") => {
                    let Ok(inner) =
                        list.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)
                    else {
                        continue;
                    };
                    for meta in inner {
                        if let Meta::NameValue(nv) = meta {
                            if nv.path.is_ident("deserialize") {
                                rule = str_lit(&nv.value).or(rule);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }
    rule
}

/// Same field case conversion serde applies for `rename_all`
fn apply_rename_rule(rule: &str, field: &str) -> String {
    match rule {
        "UPPERCASE" | "SCREAMING_SNAKE_CASE" => field.to_ascii_uppercase(),
        "PascalCase" => pascal_case(field),
        "camelCase" => {
            let pascal = pascal_case(field);
            let mut chars = pascal.chars();
            match chars.next() {
                Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                None => pascal,
            }
        }
        "kebab-case" => field.replace('_', "-"),
        "SCREAMING-KEBAB-CASE" => field.to_ascii_uppercase().replace('_', "-"),
        _ => field.to_string(),
    }
}

fn pascal_case(field: &str) -> String {
    let mut pascal = String::with_capacity(field.len());
    let mut capitalize = true;
    for ch in field.chars() {
        if ch == '_' {
            capitalize = true;
        } else if capitalize {
            pascal.push(ch.to_ascii_uppercase());
            capitalize = false;
        } else {
            pascal.push(ch);
        }
    }
    pascal
}

fn str_lit(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Str(s) => Some(s.value()),
            _ => None,
        },
        _ => None,
    }
}

fn classify(ty: &Type) -> Class {
    match generic_arg(ty, "Option") {
        Some(inner) => match classify_required(inner) {
            Class::Record { inner, boxed, .. } => Class::Record {
                inner,
                optional: true,
                boxed,
            },
            Class::Records { inner, boxed, .. } => Class::Records {
                inner,
                optional: true,
                boxed,
            },
            Class::Value => Class::Value,
        },
        None => classify_required(ty),
    }
}

fn classify_required(ty: &Type) -> Class {
    if let Some(inner) = generic_arg(ty, "Box") {
        if is_record_type(inner) {
            return Class::Record {
                inner: inner.clone(),
                optional: false,
                boxed: true,
            };
        }
        return Class::Value;
    }
    if let Some(element) = generic_arg(ty, "Vec") {
        let (element, boxed) = match generic_arg(element, "Box") {
            Some(unboxed) => (unboxed, true),
            None => (element, false),
        };
        if is_record_type(element) {
            return Class::Records {
                inner: element.clone(),
                optional: false,
                boxed,
            };
        }
        return Class::Value;
    }
    if is_record_type(ty) {
        return Class::Record {
            inner: ty.clone(),
            optional: false,
            boxed: false,
        };
    }
    Class::Value
}

/// Single type argument of `ty` when its last segment is `wrapper`
fn generic_arg<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

/// A plain path to a type outside the standard set is taken for a record
fn is_record_type(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    if path.qself.is_some() {
        return false;
    }
    let Some(segment) = path.path.segments.last() else {
        return false;
    };
    if !segment.arguments.is_empty() {
        return false;
    }
    let ident = segment.ident.to_string();
    !STD_TYPES.contains(&ident.as_str())
}

const STD_TYPES: [&str; 34] = [
    "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16", "i32", "i64", "i128", "isize",
    "f32", "f64", "bool", "char", "str", "String", "Option", "Vec", "VecDeque", "HashMap",
    "HashSet", "BTreeMap", "BTreeSet", "Box", "Rc", "Arc", "Cow", "Value", "Map", "Number",
    "PathBuf", "Duration",
];

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn class_of(ty: Type) -> &'static str {
        match classify(&ty) {
            Class::Value => "value",
            Class::Record {
                optional: false,
                boxed: false,
                ..
            } => "record",
            Class::Record {
                optional: true,
                boxed: false,
                ..
            } => "optional record",
            Class::Record { boxed: true, .. } => "boxed record",
            Class::Records {
                optional: false, ..
            } => "records",
            Class::Records { optional: true, .. } => "optional records",
        }
    }

    #[test]
    fn test_classify_std_types() {
        assert_eq!(class_of(parse_quote!(String)), "value");
        assert_eq!(class_of(parse_quote!(i64)), "value");
        assert_eq!(class_of(parse_quote!(Vec<String>)), "value");
        assert_eq!(class_of(parse_quote!(Option<u8>)), "value");
        assert_eq!(class_of(parse_quote!(HashMap<String, i32>)), "value");
        assert_eq!(class_of(parse_quote!(serde_json::Value)), "value");
        assert_eq!(class_of(parse_quote!((i32, i32))), "value");
    }

    #[test]
    fn test_classify_records() {
        assert_eq!(class_of(parse_quote!(Nested)), "record");
        assert_eq!(class_of(parse_quote!(crate::model::Nested)), "record");
        assert_eq!(class_of(parse_quote!(Option<Nested>)), "optional record");
        assert_eq!(class_of(parse_quote!(Box<Nested>)), "boxed record");
        assert_eq!(class_of(parse_quote!(Option<Box<Nested>>)), "boxed record");
        assert_eq!(class_of(parse_quote!(Vec<Nested>)), "records");
        assert_eq!(class_of(parse_quote!(Vec<Box<Nested>>)), "records");
        assert_eq!(class_of(parse_quote!(Option<Vec<Nested>>)), "optional records");
        assert_eq!(class_of(parse_quote!(Wrapper<Nested>)), "value");
    }

    #[test]
    fn test_serde_rename_all() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[serde(default, rename_all = "PascalCase")])];
        assert_eq!(serde_rename_all(&attrs), Some("PascalCase".to_string()));

        let attrs: Vec<Attribute> = vec![parse_quote!(#[serde(rename_all(deserialize = "camelCase"))])];
        assert_eq!(serde_rename_all(&attrs), Some("camelCase".to_string()));

        let attrs: Vec<Attribute> = vec![parse_quote!(#[derive(Debug)])];
        assert_eq!(serde_rename_all(&attrs), None);
    }

    #[test]
    fn test_apply_rename_rule() {
        assert_eq!(apply_rename_rule("PascalCase", "deep_nested"), "DeepNested");
        assert_eq!(apply_rename_rule("camelCase", "deep_nested"), "deepNested");
        assert_eq!(apply_rename_rule("SCREAMING_SNAKE_CASE", "deep_nested"), "DEEP_NESTED");
        assert_eq!(apply_rename_rule("kebab-case", "deep_nested"), "deep-nested");
        assert_eq!(apply_rename_rule("SCREAMING-KEBAB-CASE", "deep_nested"), "DEEP-NESTED");
        assert_eq!(apply_rename_rule("lowercase", "deep_nested"), "deep_nested");
        assert_eq!(apply_rename_rule("snake_case", "name"), "name");
    }

    #[test]
    fn test_serde_rename() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[serde(default, rename = "kind")])];
        assert_eq!(serde_rename(&attrs), Some("kind".to_string()));

        let attrs: Vec<Attribute> =
            vec![parse_quote!(#[serde(rename(serialize = "out", deserialize = "in"))])];
        assert_eq!(serde_rename(&attrs), Some("in".to_string()));

        let attrs: Vec<Attribute> =
            vec![parse_quote!(#[serde(skip_serializing_if = "Option::is_none")])];
        assert_eq!(serde_rename(&attrs), None);
    }
}
