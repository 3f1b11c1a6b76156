use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, FnArg, ItemFn, PatType, Type};

fn formatted_arg_error_msg(arg_name: &str, arg_pos: usize, fn_name: &str) -> String {
    format!(
        "Expected argument {} ('{}') of builtin {} to be f64",
        arg_pos, arg_name, fn_name
    )
}

/// Turns `fn name(a: f64, b: f64) -> Result<f64, EvaluationError>` into a whitelist entry
/// point `fn name(args: &[f64]) -> Result<f64, EvaluationError>` that rejects a wrong
/// number of arguments before running the annotated body.
#[proc_macro_attribute]
pub fn builtin(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    let attrs = &input.attrs;
    let vis = &input.vis;
    let fn_name = &input.sig.ident;
    let fn_args = &input.sig.inputs;
    let fn_body = &input.block;
    let fn_output = &input.sig.output;
    let name = fn_name.to_string();

    let mut arg_extractions = Vec::new();

    for (i, arg) in fn_args.iter().enumerate() {
        let FnArg::Typed(PatType { pat, ty, .. }) = arg else {
            return syn::Error::new_spanned(arg, "builtins cannot take self")
                .to_compile_error()
                .into();
        };

        let arg_name = match **pat {
            syn::Pat::Ident(ref ident) => &ident.ident,
            _ => {
                return syn::Error::new_spanned(pat, "Unsupported pattern")
                    .to_compile_error()
                    .into()
            }
        };

        match **ty {
            Type::Path(ref type_path) if type_path.path.is_ident("f64") => {
                arg_extractions.push(quote! {
                    let #arg_name: f64 = args[#i];
                });
            }
            _ => {
                let err_msg = formatted_arg_error_msg(&arg_name.to_string(), i, &name);
                return syn::Error::new_spanned(ty, err_msg)
                    .to_compile_error()
                    .into();
            }
        }
    }

    let args_len = arg_extractions.len();
    let expanded = quote! {
        #(#attrs)*
        #vis fn #fn_name(args: &[f64]) #fn_output {
            if args.len() != #args_len {
                return Err(crate::error::EvaluationError::arity(#name, #args_len, args.len()));
            }

            #(#arg_extractions)*

            #fn_body
        }
    };

    TokenStream::from(expanded)
}
