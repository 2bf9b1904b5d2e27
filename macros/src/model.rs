use darling::{ast, FromDeriveInput, FromField};
use proc_macro2::TokenTree;
use quote::{format_ident, quote, ToTokens};
use syn::Meta;

/// Attributes that are meaningful on the generated form.
const FORWARDED: &[&str] = &["doc", "serde", "validate", "schemars"];

#[derive(Debug, FromDeriveInput)]
#[darling(supports(struct_named))]
struct ModelInputReceiver {
	ident: syn::Ident,

	data: ast::Data<(), ModelFieldReceiver>,
}

#[derive(Debug, FromField)]
#[darling(forward_attrs)]
struct ModelFieldReceiver {
	ident: Option<syn::Ident>,

	ty: syn::Type,
	vis: syn::Visibility,

	attrs: Vec<syn::Attribute>,
}

/// Returns `true` if the attribute is `#[serde(..)]` and contains one of the given idents.
fn serde_has(attr: &syn::Attribute, idents: &[&str]) -> bool {
	let Meta::List(ref list) = attr.meta else {
		return false;
	};

	if !list.path.is_ident("serde") {
		return false;
	}

	list.tokens.to_token_stream().into_iter().any(|token| {
		matches!(token, TokenTree::Ident(ref ident) if idents.iter().any(|i| ident == i))
	})
}

/// Returns `true` for `#[serde(skip_serializing)]` and nothing else, which only
/// hides a column from public output and should not hide it from the form.
fn is_bare_skip_serializing(attr: &syn::Attribute) -> bool {
	let Meta::List(ref list) = attr.meta else {
		return false;
	};

	let tokens = list.tokens.to_token_stream().into_iter().collect::<Vec<_>>();

	list.path.is_ident("serde")
		&& matches!(tokens.as_slice(), [TokenTree::Ident(ident)] if ident == "skip_serializing")
}

pub fn from_input(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
	let input = syn::parse_macro_input!(input as syn::DeriveInput);
	let receiver = match ModelInputReceiver::from_derive_input(&input) {
		Ok(x) => x,
		Err(e) => return e.write_errors().into(),
	};

	let ident = &receiver.ident;
	let vis = &input.vis;
	let form_ident = format_ident!("{}Form", ident);
	let doc = format!("Submitted form fields of a [`{ident}`].");

	let fields = match receiver.data.take_struct() {
		Some(fields) => fields,
		None => {
			return syn::Error::new_spanned(&input.ident, "#[model] only supports structs")
				.into_compile_error()
				.into()
		}
	};

	let fields = fields.iter().filter_map(|field| {
		let ident = field.ident.as_ref()?;
		let ty = &field.ty;
		let vis = &field.vis;

		// Columns the client never submits are not part of the form
		if field
			.attrs
			.iter()
			.any(|attr| serde_has(attr, &["skip_deserializing", "skip"]))
		{
			return None;
		}

		let attrs = field.attrs.iter().filter(|attr| {
			FORWARDED.iter().any(|name| attr.path().is_ident(name)) && !is_bare_skip_serializing(attr)
		});

		Some(quote! {
			#(#attrs)*
			#vis #ident: #ty,
		})
	});

	quote! {
		#input

		#[doc = #doc]
		#[derive(
			Debug,
			Clone,
			::serde::Deserialize,
			::serde::Serialize,
			::validator::Validate,
			::schemars::JsonSchema,
		)]
		#vis struct #form_ident {
			#(
				#fields
			)*
		}
	}
	.into()
}
