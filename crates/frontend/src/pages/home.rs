use leptos::prelude::*;
use leptos_router::components::A;

/// Карточки возможностей: заголовок и описание
const FEATURES: [(&str, &str); 3] = [
    (
        "Bank Reconciliation",
        "Automatically match transactions and identify discrepancies.",
    ),
    (
        "Financial Insights",
        "Real-time reporting and visualization of your financial data.",
    ),
    (
        "AI Assistant",
        "Get answers to your financial questions in real-time.",
    ),
];

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <div class="home-page">
            <h1 class="home-page__title">"Welcome to QuantoBooks"</h1>
            <p class="home-page__lead">
                "AI-powered bookkeeping platform for e-commerce businesses. "
                "Simplify reconciliation, detect discrepancies, and gain financial insights."
            </p>

            <div class="home-page__actions">
                <A href="/dashboard" attr:class="button button--primary">"View Dashboard"</A>
                <A href="/chat" attr:class="button button--outline">"Chat with AI"</A>
            </div>

            <div class="home-page__features">
                {FEATURES
                    .into_iter()
                    .map(|(title, text)| {
                        view! {
                            <div class="home-page__feature">
                                <h2>{title}</h2>
                                <p>{text}</p>
                            </div>
                        }
                    })
                    .collect_view()}
            </div>
        </div>
    }
}
