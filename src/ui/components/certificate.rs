use crate::api::models::Certificate;
use crate::ui::AppContext;
use dioxus::prelude::*;

/// Public certificate verification view. Rendering only; PDF export is the
/// platform website's job.
#[component]
pub fn CertificateView(cert_hash: String) -> Element {
    let context = use_context::<AppContext>();
    let mut certificate = use_signal(|| None::<Certificate>);
    let mut loading = use_signal(|| true);
    let mut error = use_signal(|| None::<String>);

    {
        let cert_hash = cert_hash.clone();
        use_effect(move || {
            let api = context.api.clone();
            let cert_hash = cert_hash.clone();
            spawn(async move {
                loading.set(true);
                match api.certificate(&cert_hash).await {
                    Ok(payload) => {
                        certificate.set(Some(payload));
                        loading.set(false);
                    }
                    Err(e) => {
                        error.set(Some(format!("Certificate not found or expired ({})", e)));
                        loading.set(false);
                    }
                }
            });
        });
    }

    rsx! {
        div { class: "max-w-2xl mx-auto mt-12 p-6",
            if loading() {
                div { class: "flex justify-center items-center py-12",
                    div { class: "animate-spin rounded-full h-12 w-12 border-b-2 border-blue-500" }
                }
            } else if let Some(err) = error() {
                div { class: "bg-red-900 border border-red-700 text-red-100 px-4 py-3 rounded",
                    p { "{err}" }
                }
            } else if let Some(cert) = certificate() {
                div { class: "bg-gray-800 rounded-lg p-8 text-center",
                    h1 { class: "text-2xl font-bold text-white mb-2", "Certificate of Completion" }
                    p { class: "text-gray-400 mb-6", "{cert.trail_title}" }
                    p { class: "text-xl text-gray-100 mb-6", "{cert.student_name}" }
                    if let Some(issued) = cert.issued_at.as_ref() {
                        p { class: "text-sm text-gray-500", "Issued {issued}" }
                    }
                    p { class: "text-sm text-gray-500 mb-4", "Credential {cert.credential_id}" }
                    img {
                        class: "mx-auto w-32 h-32",
                        src: "{cert.qr_code_data_uri}",
                    }
                    a {
                        class: "block mt-4 text-blue-400 hover:underline text-sm",
                        href: "{cert.verification_url}",
                        "Verify this certificate"
                    }
                }
            }
        }
    }
}
