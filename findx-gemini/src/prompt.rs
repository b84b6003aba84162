//! Comparison prompt sent to the model.

use findx_core::ReportSummary;

const PREAMBLE: &str = "You are an AI assistant for matching lost and found items.\n\n\
Compare these two items and determine if they could be the same:\n";

const INSTRUCTIONS: &str = "\nRespond with JSON only:\n\
{\n  \"confidence\": 0-100 (percentage match likelihood),\n  \
\"reasons\": [\"array\", \"of\", \"reasons\", \"for\", \"the\", \"confidence\", \"score\"]\n}\n\n\
Be strict: only give high confidence if the items are very likely the same.";

/// Render the prompt comparing `lost` with `found`.
pub fn comparison_prompt(lost: &ReportSummary<'_>, found: &ReportSummary<'_>) -> String {
    let mut prompt = String::from(PREAMBLE);
    push_item(&mut prompt, "LOST ITEM", lost);
    push_item(&mut prompt, "FOUND ITEM", found);
    prompt.push_str(INSTRUCTIONS);
    prompt
}

fn push_item(prompt: &mut String, heading: &str, item: &ReportSummary<'_>) {
    prompt.push_str(&format!(
        "\n{heading}:\n- Title: {}\n- Description: {}\n- Tags: {}\n- Category: {}\n",
        item.title,
        item.description,
        item.tags.join(", "),
        item.category,
    ));
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests should fail fast when setup breaks"
)]
mod tests {
    use super::*;
    use findx_core::Category;
    use rstest::rstest;

    #[rstest]
    fn prompt_lists_lost_before_found() {
        let lost_tags = vec!["iphone".to_owned(), "space black".to_owned()];
        let found_tags = vec!["phone".to_owned()];
        let lost = ReportSummary {
            title: "iPhone 15 Pro Max",
            description: "cracked screen",
            tags: &lost_tags,
            category: Category::Item,
        };
        let found = ReportSummary {
            title: "Phone near library",
            description: "",
            tags: &found_tags,
            category: Category::Item,
        };

        let prompt = comparison_prompt(&lost, &found);

        assert!(prompt.contains(
            "LOST ITEM:\n- Title: iPhone 15 Pro Max\n- Description: cracked screen\n- Tags: iphone, space black\n- Category: item\n"
        ));
        assert!(prompt.contains("FOUND ITEM:\n- Title: Phone near library\n"));
        let lost_at = prompt.find("LOST ITEM").expect("lost heading");
        let found_at = prompt.find("FOUND ITEM").expect("found heading");
        assert!(lost_at < found_at);
        assert!(prompt.contains("Respond with JSON only"));
        assert!(prompt.ends_with("very likely the same."));
    }
}
