use quote::ToTokens;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Attribute, Field, FieldsNamed, Token, Type};

/// 宏参数中的 `debug = true|false`，缺省为 `true`
pub(crate) struct DebugFlag(pub Option<bool>);

impl DebugFlag {
    pub(crate) fn enabled(&self) -> bool {
        self.0.unwrap_or(true)
    }
}

/// 解析 `debug = <bool>` 的右值
pub(crate) fn parse_bool_literal(input: ParseStream) -> syn::Result<bool> {
    let _eq: Token![=] = input.parse()?;
    let expr: syn::Expr = input.parse()?;
    match expr {
        syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Bool(b),
            ..
        }) => Ok(b.value()),
        other => Err(syn::Error::new(
            other.span(),
            "expected boolean literal for 'debug'",
        )),
    }
}

impl Parse for DebugFlag {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.is_empty() {
            return Ok(Self(None));
        }
        let key: syn::Ident = input.parse()?;
        if key != "debug" {
            return Err(syn::Error::new(
                key.span(),
                "unknown key in attribute; expected 'debug'",
            ));
        }
        let value = parse_bool_literal(input)?;
        if !input.is_empty() {
            let _comma: Option<Token![,]> = input.parse()?;
        }
        Ok(Self(Some(value)))
    }
}

// 归一化 derive 的 key，避免 Serialize/serde::Serialize 重复
fn derive_key(p: &syn::Path) -> String {
    match p.segments.last() {
        Some(last) => {
            let ident = last.ident.to_string();
            match ident.as_str() {
                "Serialize" | "Deserialize" => format!("serde::{ident}"),
                _ => ident,
            }
        }
        None => p.to_token_stream().to_string(),
    }
}

/// 合并 derive：required 在前，已有的派生去重后追加，其余属性保持原样
pub(crate) fn apply_derives(attrs: &mut Vec<Attribute>, required: Vec<syn::Path>) {
    let mut retained = Vec::new();
    let mut existing = Vec::new();

    for attr in attrs.drain(..) {
        if !attr.path().is_ident("derive") {
            retained.push(attr);
            continue;
        }
        if let Ok(list) =
            attr.parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated)
        {
            existing.extend(list);
        }
    }

    let mut seen = std::collections::HashSet::new();
    let merged: Vec<syn::Path> = required
        .into_iter()
        .chain(existing)
        .filter(|p| seen.insert(derive_key(p)))
        .collect();

    attrs.push(syn::parse_quote!(#[derive(#(#merged),*)]));
    attrs.extend(retained);
}

/// 把所需字段按顺序放到最前：已存在则复用原定义，缺失则按给定类型新建
pub(crate) fn hoist_required_fields(fields: &mut FieldsNamed, required: &[(&str, Type)]) {
    let old: Vec<Field> = fields.named.iter().cloned().collect();
    let mut named: Punctuated<Field, Token![,]> = Punctuated::new();

    let is_named = |f: &Field, name: &str| f.ident.as_ref().is_some_and(|i| i == name);

    for (name, ty) in required {
        match old.iter().find(|f| is_named(f, name)) {
            Some(existing) => named.push(existing.clone()),
            None => {
                let ident = syn::Ident::new(name, proc_macro2::Span::call_site());
                named.push(syn::parse_quote! { #ident: #ty });
            }
        }
    }

    for f in old {
        if !required.iter().any(|(name, _)| is_named(&f, name)) {
            named.push(f);
        }
    }

    fields.named = named;
}
