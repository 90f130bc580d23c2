//! Instruction templates sent to the language model.

pub const SYSTEM_PROMPT: &str = r#"You design configurations for a web scraper.
Read the HTML you are given and answer with a single JSON object:

{
  "page_type": "pagination" | "infinite_scroll" | "single_page",
  "item_container_selector": "<CSS selector matching ONE repeated item>",
  "next_button_selector": "<CSS selector of the next-page control>" | null
}

Guidelines:
- item_container_selector wraps exactly one product, listing, job or article.
  Prefer specific class selectors such as "article.product_pod" or
  "div.job_listing"; use bare tags only when nothing better exists.
- Use "pagination" when you see numbered pages or a Next link,
  "infinite_scroll" when the list is long and grows as the user scrolls,
  and "single_page" otherwise.
- next_button_selector is the element to click for the next page; null
  unless page_type is "pagination".
Reply with JSON only."#;

pub const ANALYSIS_PROMPT: &str = r#"Simplified page body:

{html_content}

Return the scraper configuration JSON."#;

pub const SUMMARY_PROMPT: &str = r#"You are a business intelligence analyst.
Here is raw scraped data as JSON:

{data}

Write a Markdown report with three parts:
1. **Data Overview**: what kind of records these are (for example real estate listings or e-commerce products).
2. **Key Insights**: price ranges, recurring keywords, notable patterns.
3. **Stats**: how many records and how varied they are.

Stay professional and under 150 words."#;

pub fn analysis_prompt(html: &str) -> String {
    ANALYSIS_PROMPT.replace("{html_content}", html)
}

pub fn summary_prompt(data_json: &str) -> String {
    SUMMARY_PROMPT.replace("{data}", data_json)
}
