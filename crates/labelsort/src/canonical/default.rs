/// OWASP Top 10 for LLM applications, LLM01..LLM10.
pub fn owasp_llm_top10() -> Vec<String> {
    [
        "Prompt Injection",
        "Sensitive Information Disclosure",
        "Supply Chain Vulnerabilities",
        "Data and Model Poisoning",
        "Improper Output Handling",
        "Excessive Agency",
        "System Prompt Leakage",
        "Vector and Embedding Weaknesses",
        "Overreliance / Misinformation",
        // naming of LLM10 varies across summaries
        "Unbounded Consumption / Model Theft",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
