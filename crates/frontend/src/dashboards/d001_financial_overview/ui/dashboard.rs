use contracts::dashboards::d001_financial_overview::dto::{
    DiscrepancyStatus, FinancialOverviewResponse,
};
use leptos::prelude::*;
use leptos::task::spawn_local;
use thaw::*;

use crate::dashboards::d001_financial_overview::api;
use crate::dashboards::d001_financial_overview::summary::{last_months, resolve, summarize, Metric};
use crate::shared::date_utils::{format_currency, format_date};

/// Диапазоны тренда: подпись и число месяцев
const RANGES: [(&str, usize); 3] = [("3M", 3), ("6M", 6), ("1Y", 12)];

/// Financial Overview Dashboard component
#[component]
pub fn FinancialOverviewDashboard() -> impl IntoView {
    let (data, set_data) = signal(None::<FinancialOverviewResponse>);
    let (loading, set_loading) = signal(true);
    let (error, set_error) = signal(None::<String>);
    let (metric, set_metric) = signal(Metric::Revenue);
    let (months, set_months) = signal(6usize);

    Effect::new(move |_| {
        spawn_local(async move {
            match api::get_financial_overview().await {
                Ok(response) => {
                    set_data.set(Some(response));
                    set_error.set(None);
                }
                Err(e) => {
                    log::error!("Failed to load D001 financial overview: {}", e);
                    set_error.set(Some(e));
                }
            }
            set_loading.set(false);
        });
    });

    let on_resolve = move |id: u32| {
        set_data.update(|d| {
            if let Some(d) = d {
                resolve(&mut d.discrepancies, id);
            }
        });
    };

    view! {
        <div class="dashboard-page">
            <Flex justify=FlexJustify::SpaceBetween align=FlexAlign::Center>
                <h1>"Financial Dashboard"</h1>
            </Flex>

            {move || error.get().map(|e| view! { <div class="dashboard-error">{e}</div> })}

            <Show
                when=move || !loading.get()
                fallback=|| view! { <div class="dashboard-loading"><Spinner />" Loading..."</div> }
            >
                // Виджеты
                <div class="dashboard-widgets">
                    {move || {
                        data.get()
                            .map(|d| {
                                [
                                    ("Total Revenue", d.revenue),
                                    ("Total Expenses", d.expenses),
                                    ("Net Profit", d.profit),
                                ]
                                    .into_iter()
                                    .map(|(title, value)| {
                                        view! {
                                            <div class="dashboard-card">
                                                <div class="dashboard-card__title">{title}</div>
                                                <div class="dashboard-card__value">
                                                    {format_currency(value)}
                                                </div>
                                            </div>
                                        }
                                    })
                                    .collect_view()
                            })
                    }}
                </div>

                // Тренд
                <div class="dashboard-card">
                    <Flex justify=FlexJustify::SpaceBetween align=FlexAlign::Center>
                        <h3>{move || metric.get().title()}</h3>
                        <Flex style="gap: 4px;">
                            {RANGES
                                .into_iter()
                                .map(|(label, count)| {
                                    view! {
                                        <Button
                                            size=ButtonSize::Small
                                            appearance=Signal::derive(move || {
                                                if months.get() == count {
                                                    ButtonAppearance::Primary
                                                } else {
                                                    ButtonAppearance::Subtle
                                                }
                                            })
                                            on_click=move |_| set_months.set(count)
                                        >
                                            {label}
                                        </Button>
                                    }
                                })
                                .collect_view()}
                        </Flex>
                    </Flex>

                    <Flex justify=FlexJustify::SpaceBetween align=FlexAlign::Center>
                        <Flex style="gap: 4px;">
                            {Metric::all()
                                .into_iter()
                                .map(|m| {
                                    view! {
                                        <Button
                                            size=ButtonSize::Small
                                            appearance=Signal::derive(move || {
                                                if metric.get() == m {
                                                    ButtonAppearance::Primary
                                                } else {
                                                    ButtonAppearance::Secondary
                                                }
                                            })
                                            on_click=move |_| set_metric.set(m)
                                        >
                                            {m.label()}
                                        </Button>
                                    }
                                })
                                .collect_view()}
                        </Flex>
                        {move || {
                            let d = data.get()?;
                            let m = metric.get();
                            let values: Vec<f64> = last_months(&d.trend, months.get())
                                .iter()
                                .map(|p| m.value(p))
                                .collect();
                            let summary = summarize(&values)?;
                            let arrow = if summary.percent_change >= 0.0 { "↑" } else { "↓" };
                            let class = if summary.percent_change >= 0.0 {
                                "trend-up"
                            } else {
                                "trend-down"
                            };
                            Some(view! {
                                <div class="dashboard-summary">
                                    <div class="dashboard-card__value">{format_currency(summary.current)}</div>
                                    <div class=class>
                                        {format!("{} {:.1}% vs previous", arrow, summary.percent_change.abs())}
                                    </div>
                                </div>
                            })
                        }}
                    </Flex>

                    <table class="dashboard-table">
                        <thead>
                            <tr>
                                <th>"Period"</th>
                                <th>"Revenue"</th>
                                <th>"Expenses"</th>
                                <th>"Profit"</th>
                            </tr>
                        </thead>
                        <tbody>
                            {move || {
                                data.get()
                                    .map(|d| {
                                        last_months(&d.trend, months.get())
                                            .into_iter()
                                            .map(|p| {
                                                view! {
                                                    <tr>
                                                        <td>{p.period.clone()}</td>
                                                        <td>{format_currency(p.revenue)}</td>
                                                        <td>{format_currency(p.expenses)}</td>
                                                        <td>{format_currency(p.profit)}</td>
                                                    </tr>
                                                }
                                            })
                                            .collect_view()
                                    })
                            }}
                        </tbody>
                    </table>
                </div>

                // Расхождения
                <div class="dashboard-card">
                    <h3>"Discrepancy Portal"</h3>
                    <table class="dashboard-table">
                        <thead>
                            <tr>
                                <th>"Date"</th>
                                <th>"Amount"</th>
                                <th>"Status"</th>
                                <th>"Action"</th>
                            </tr>
                        </thead>
                        <tbody>
                            {move || {
                                data.get()
                                    .map(|d| {
                                        d.discrepancies
                                            .into_iter()
                                            .map(|item| {
                                                let id = item.id;
                                                let color = match item.status {
                                                    DiscrepancyStatus::Pending => BadgeColor::Warning,
                                                    DiscrepancyStatus::Resolved => BadgeColor::Success,
                                                    DiscrepancyStatus::UnderReview => BadgeColor::Informative,
                                                };
                                                let resolvable = item.status != DiscrepancyStatus::Resolved;
                                                view! {
                                                    <tr>
                                                        <td>{format_date(&item.date)}</td>
                                                        <td>{format_currency(item.amount)}</td>
                                                        <td>
                                                            <Badge appearance=BadgeAppearance::Tint color=color>
                                                                {item.status.label()}
                                                            </Badge>
                                                        </td>
                                                        <td>
                                                            <Show when=move || resolvable>
                                                                <Button
                                                                    size=ButtonSize::Small
                                                                    appearance=ButtonAppearance::Secondary
                                                                    on_click=move |_| on_resolve(id)
                                                                >
                                                                    "Resolve"
                                                                </Button>
                                                            </Show>
                                                        </td>
                                                    </tr>
                                                }
                                            })
                                            .collect_view()
                                    })
                            }}
                        </tbody>
                    </table>
                </div>
            </Show>
        </div>
    }
}
