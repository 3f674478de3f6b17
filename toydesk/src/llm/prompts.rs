//! Prompt templates for the support assistant.
//!
//! Templates use plain `format!()` interpolation; every block they receive is
//! already rendered text.

use crate::context::ContextDocuments;

/// Told to the model when the reference documents could not be loaded.
pub const DOCUMENTS_UNAVAILABLE_NOTE: &str = "Store reference documents are temporarily unavailable. \
Do not invent policies, prices or contact details; offer to connect the customer with a human agent instead.";

/// Build the system prompt for one support reply.
///
/// Sections appear in a fixed order: role instructions, store reference
/// documents (or [`DOCUMENTS_UNAVAILABLE_NOTE`]), the product block and the
/// conversation memory block. The product catalog itself is never inlined;
/// `product_block` carries the matched subset.
///
/// # Example
/// ```
/// use toydesk::llm::prompts::support_system_prompt;
///
/// let prompt = support_system_prompt(
///     None,
///     "No specific product recommendations needed for this query.",
///     "New conversation - no previous context.",
/// );
/// assert!(prompt.contains("temporarily unavailable"));
/// assert!(prompt.ends_with("New conversation - no previous context."));
/// ```
pub fn support_system_prompt(
    documents: Option<&ContextDocuments>,
    product_block: &str,
    memory_block: &str,
) -> String {
    let reference = match documents {
        Some(docs) => reference_section(docs),
        None => DOCUMENTS_UNAVAILABLE_NOTE.to_string(),
    };

    format!(
        r#"You are the customer-support assistant for an online toy store.
Answer in the language the customer writes in, including romanised Hindi.
Keep replies short and friendly. Only state store facts that appear in the reference material below.

## Store reference
{reference}

## Relevant products
{product_block}

## Conversation so far
{memory_block}"#
    )
}

fn reference_section(docs: &ContextDocuments) -> String {
    let sections: Vec<String> = docs
        .named()
        .into_iter()
        .filter(|(name, text)| *name != "product" && !text.trim().is_empty())
        .map(|(name, text)| format!("### {}\n{}", heading(name), text.trim()))
        .collect();

    if sections.is_empty() {
        return DOCUMENTS_UNAVAILABLE_NOTE.to_string();
    }
    sections.join("\n\n")
}

fn heading(name: &str) -> &'static str {
    match name {
        "contact" => "Contact",
        "privacy" => "Privacy policy",
        "detail" => "Store details",
        _ => "Notes",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn docs() -> ContextDocuments {
        ContextDocuments {
            product: "https://thegurtoys.com/products/gurtoy-kids-scooter".to_string(),
            contact: "Call +91 98765 43210\n".to_string(),
            privacy: "We never sell your data.".to_string(),
            detail: String::new(),
        }
    }

    #[test]
    fn test_reference_sections_skip_catalog_and_blank_documents() {
        assert_eq!(
            reference_section(&docs()),
            "### Contact\nCall +91 98765 43210\n\n### Privacy policy\nWe never sell your data."
        );
    }

    #[test]
    fn test_prompt_contains_every_block_in_order() {
        let prompt = support_system_prompt(Some(&docs()), "- [Kids Scooter](u)", "user: hi");

        let reference = prompt.find("## Store reference").unwrap();
        let products = prompt.find("## Relevant products").unwrap();
        let memory = prompt.find("## Conversation so far").unwrap();
        assert!(reference < products && products < memory);

        assert!(prompt.contains("We never sell your data."));
        assert!(prompt.contains("- [Kids Scooter](u)"));
        assert!(prompt.ends_with("user: hi"));
        assert!(!prompt.contains("gurtoy-kids-scooter"));
    }

    #[test]
    fn test_missing_documents_use_unavailable_note() {
        let prompt = support_system_prompt(None, "p", "m");
        assert!(prompt.contains(DOCUMENTS_UNAVAILABLE_NOTE));

        let only_catalog = ContextDocuments {
            product: "https://thegurtoys.com/products/gurtoy-doll".to_string(),
            ..Default::default()
        };
        let prompt = support_system_prompt(Some(&only_catalog), "p", "m");
        assert!(prompt.contains(DOCUMENTS_UNAVAILABLE_NOTE));
    }
}
