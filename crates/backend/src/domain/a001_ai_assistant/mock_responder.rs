//! Заготовленные ответы на случай, когда LLM недоступна или не настроена.
//! Тексты ответов являются тестовыми данными, а не бизнес-логикой.

use std::time::Duration;

const RECONCILIATION_REPLY: &str = "Bank reconciliation is the process of matching your books against your bank statements. I can help you identify discrepancies and suggest adjustments. Would you like me to analyze your latest bank statement?";

const DISCREPANCY_REPLY: &str = "I've detected 3 cash discrepancies in your recent transactions:\n\n1. Invoice #1089 - Expected: $1,250.00, Received: $1,200.00 (-$50.00)\n2. Payment #4502 - Expected: $3,720.50, Recorded: $3,270.50 (-$450.00)\n3. Refund #782 - Expected: $129.99, Processed: $0.00 (-$129.99)\n\nWould you like me to suggest correction entries?";

const EXPENSE_REPLY: &str = "Your top expense categories for this quarter are:\n\n1. Product Inventory: $42,500 (45%)\n2. Marketing & Advertising: $15,300 (16%)\n3. Shipping & Fulfillment: $12,200 (13%)\n4. Software Subscriptions: $8,700 (9%)\n5. Office Expenses: $5,400 (6%)\n\nYour shipping costs have increased 7.5% compared to last quarter. Would you like recommendations to reduce these expenses?";

const REVENUE_REPLY: &str = "Based on your current data, your revenue is trending upward by 12.3% quarter-over-quarter while expenses remain stable (+2.1%). This has improved your profit margin by 4.2% compared to last quarter. Your best performing product categories are Electronics (+18%) and Home Goods (+15%).";

const TAX_REPLY: &str = "Based on your current financial data, I estimate your quarterly tax liability at approximately $12,450. You have $3,200 in potential deductions that haven't been applied yet. Would you like me to analyze these potential tax savings?";

/// Ключевые слова в порядке приоритета: побеждает первое совпадение
const KEYWORD_REPLIES: &[(&[&str], &str)] = &[
    (&["reconciliation"], RECONCILIATION_REPLY),
    (&["discrepancy"], DISCREPANCY_REPLY),
    (&["expense", "cost"], EXPENSE_REPLY),
    (&["revenue", "sales"], REVENUE_REPLY),
    (&["tax", "taxes"], TAX_REPLY),
];

/// Подбор ответа по ключевым словам (без учёта регистра)
pub fn canned_reply(query: &str) -> String {
    let lowered = query.to_lowercase();

    KEYWORD_REPLIES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(_, reply)| reply.to_string())
        .unwrap_or_else(|| {
            format!(
                "I understand your question about \"{}\". As your AI bookkeeping assistant, I can help with reconciliations, financial reporting, detecting unusual patterns in your transactions, tax planning, and expense optimization. How else can I assist you today?",
                query
            )
        })
}

/// Источник заготовленных ответов с искусственной задержкой,
/// чтобы время ответа было сопоставимо с живым API.
#[derive(Debug, Clone)]
pub struct MockResponder {
    delay: Duration,
}

impl MockResponder {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub async fn respond(&self, query: &str) -> String {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        canned_reply(query)
    }
}
