//! Prompts sent to LLM extraction backends.

use tally_core::models::{EXPENSE_CATEGORIES, INCOME_CATEGORIES};
use tally_core::ExtractionRequest;

/// System prompt describing the task and the output schema.
pub fn system_prompt() -> String {
    format!(
        r#"You extract transactions from bank and credit card statement text.

Return only a JSON object of this shape:
{{
  "transactions": [
    {{
      "date": "YYYY-MM-DD",
      "description": "string",
      "amount": 12.34,
      "type": "income" | "expense",
      "category": "string",
      "isRecurring": false,
      "merchantName": "string (optional)"
    }}
  ],
  "summary": {{
    "totalIncome": 0,
    "totalExpenses": 0,
    "transactionCount": 0,
    "dateRange": {{ "start": "YYYY-MM-DD", "end": "YYYY-MM-DD" }}
  }}
}}

Rules:
- amount is always positive; use "type" for the direction.
- Expense categories: {}.
- Income categories: {}.
- Mark subscriptions, rent, salaries and other repeating items as isRecurring.
- Skip balances, totals, fees summaries and other non-transaction lines.
- Lines at the top of the text are the statement header; use them for context only."#,
        EXPENSE_CATEGORIES.join(", "),
        INCOME_CATEGORIES.join(", ")
    )
}

/// User message for one batch.
pub fn user_prompt(request: &ExtractionRequest<'_>) -> String {
    let mut prompt = String::new();

    if request.total_batches > 1 {
        prompt.push_str(&format!(
            "This is batch {} of {} of the same statement. Extract only the transactions in this batch.\n\n",
            request.batch_number, request.total_batches
        ));
    }

    if let Some(hint) = request.duplicate_hint {
        prompt.push_str(hint);
        prompt.push_str("\nStill extract every transaction; duplicates are resolved later.\n\n");
    }

    prompt.push_str("Statement text:\n");
    prompt.push_str(request.text);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(text: &'a str, batch: usize, total: usize, hint: Option<&'a str>) -> ExtractionRequest<'a> {
        ExtractionRequest {
            text,
            batch_number: batch,
            total_batches: total,
            duplicate_hint: hint,
        }
    }

    #[test]
    fn test_system_prompt_lists_categories() {
        let prompt = system_prompt();
        assert!(prompt.contains("subscriptions"));
        assert!(prompt.contains("salary"));
        assert!(prompt.contains("\"isRecurring\""));
    }

    #[test]
    fn test_single_batch_has_no_batch_context() {
        let prompt = user_prompt(&request("01/02/2024 COFFEE 4.50", 1, 1, None));
        assert!(!prompt.contains("batch"));
        assert!(prompt.ends_with("01/02/2024 COFFEE 4.50"));
    }

    #[test]
    fn test_batch_context_and_hint() {
        let prompt = user_prompt(&request("text", 1, 3, Some("- 2024-03-01 expense 4.50")));
        assert!(prompt.starts_with("This is batch 1 of 3"));
        assert!(prompt.contains("- 2024-03-01 expense 4.50"));

        let prompt = user_prompt(&request("text", 2, 3, None));
        assert!(prompt.contains("batch 2 of 3"));
        assert!(!prompt.contains("duplicates"));
    }
}
