use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, Ident, ItemFn, Pat, Signature, Type};

/// Transform an asynchronous test into a synchronous one and inject dependencies.
///
/// Every test gets a fresh server over its own empty in-memory store.
/// Injectable dependencies are [`rocket::local::asynchronous::Client`] and
/// [`crate::store::MemoryStore`], the latter sharing its data with the server.
///
/// `#[backend_test(user)]` and `#[backend_test(admin)]` log the client in as
/// a regular user or a site admin respectively before the test runs.
#[proc_macro_attribute]
pub fn backend_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Extract type information and reject invalid function signatures.
    let test_args = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Log in the client as a user/admin if needed.
    let login_as = match parse_macro_input!(args as Option<Ident>) {
        Some(arg) if arg == "user" => Some(quote! { crate::model::db::NewUser::example() }),
        Some(arg) if arg == "admin" => Some(quote! { crate::model::db::NewUser::example_admin() }),
        Some(arg) => {
            return syn::Error::new(arg.span(), "Expected `user` or `admin`")
                .into_compile_error()
                .into();
        }
        None => None,
    };
    let maybe_login = login_as
        .map(|new_user| {
            quote! {
                crate::store::DocumentStore::insert_user(&store, &#new_user)
                    .await
                    .unwrap();

                {
                    let response = rocket_client
                        .post("/api/users/login")
                        .json(&crate::model::api::LoginRequest::example())
                        .dispatch()
                        .await;
                    assert_eq!(rocket::http::Status::Ok, response.status(), "Test login failed");
                }
            }
        })
        .unwrap_or_default();

    // Rewrite the test function.
    quote! {
        #[test]
        fn #name() {
            /// The test itself.
            #item_fn

            log4rs_test_utils::test_logging::init_logging_once_for(
                ["pollbuddy_backend"],
                None,
                None,
            );

            let runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("rocket-worker-test-thread")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async {
                // Test setup.
                let store = crate::store::MemoryStore::new();
                let rocket = crate::rocket_with_store(
                    rocket::custom(crate::config::test_figment()),
                    std::sync::Arc::new(store.clone()),
                );
                let rocket_client = rocket::local::asynchronous::Client::tracked(rocket)
                    .await
                    .unwrap();

                #maybe_login

                #new_name(#(#test_args),*).await;
            });
        }
    }
    .into()
}

/// Ensure the wrapped test is async, extract parameters to inject, and reject unknown parameters.
fn check_sig(sig: Signature) -> Result<Vec<TokenStream2>, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut has_client = false;
    let mut has_store = false;
    let mut args = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let (Pat::Ident(_), Type::Path(type_path)) = (&*pat_type.pat, &*pat_type.ty) {
                // Valid as the last path segment for any type is itself
                let type_ident = &type_path.path.segments.last().unwrap().ident;
                if type_ident == "Client" {
                    if has_client {
                        return Err(syn::Error::new(
                            input.span(),
                            "Test cannot accept more than one `rocket::local::asynchronous::Client`",
                        ));
                    }
                    has_client = true;
                    args.push(quote! { rocket_client });
                    continue;
                } else if type_ident == "MemoryStore" {
                    if has_store {
                        return Err(syn::Error::new(
                            input.span(),
                            "Test cannot accept more than one `MemoryStore`",
                        ));
                    }
                    has_store = true;
                    args.push(quote! { store.clone() });
                    continue;
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected one of `client_ident: Client` or `store_ident: MemoryStore`",
        ));
    }

    Ok(args)
}
