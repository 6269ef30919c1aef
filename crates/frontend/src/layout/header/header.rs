use leptos::prelude::*;
use leptos_router::components::A;

/// Пункты главного меню: адрес и подпись
const NAV_ITEMS: [(&str, &str); 3] = [("/", "Home"), ("/dashboard", "Dashboard"), ("/chat", "AI Chat")];

#[component]
pub fn Header() -> impl IntoView {
    view! {
        <header data-zone="header" class="header">
            <div class="header__content">
                <A href="/" attr:class="header__title">"QuantoBooks"</A>
            </div>
            <nav class="header__actions">
                {NAV_ITEMS
                    .into_iter()
                    .map(|(href, label)| {
                        view! { <A href=href attr:class="header__link">{label}</A> }
                    })
                    .collect_view()}
            </nav>
        </header>
    }
}
