//! Terminal rendering for command results.

use studylens_core::types::{HistoryPage, ProcessingResponse, ProcessingResult};
use studylens_processing::ProcessingState;

pub fn render_processing_state(state: &ProcessingState) {
    match (&state.result, &state.error) {
        (Some(result), _) => render_result(result),
        (None, Some(error)) => eprintln!("Error: {error}"),
        (None, None) => eprintln!("No result yet"),
    }
}

pub fn render_result(result: &ProcessingResult) {
    if !result.request_id.is_empty() {
        println!("Request:    {}", result.request_id);
    }
    println!("Status:     {}", result.status);
    if let Some(subject) = &result.subject_detected {
        println!("Subject:    {subject}");
    }
    if let Some(confidence) = result.confidence_score {
        println!("Confidence: {:.0}%", confidence * 100.0);
    }
    println!("Time:       {:.2}s", result.processing_time_total);
    if let Some(text) = &result.extracted_text {
        println!("\nExtracted text:\n{text}");
    }
    if let Some(explanation) = &result.ai_explanation {
        println!("\nExplanation:\n{explanation}");
    }
}

pub fn render_envelope(envelope: &ProcessingResponse) {
    match &envelope.result {
        Some(result) => render_result(result),
        None => {
            let message = envelope
                .message
                .clone()
                .or_else(|| envelope.error.clone())
                .unwrap_or_else(|| {
                    format!("request {} is {}", envelope.request_id, envelope.status)
                });
            println!("{message}");
        }
    }
}

pub fn render_history(page: &HistoryPage) {
    println!(
        "{} of {} requests (limit {})",
        page.requests.len(),
        page.total,
        page.limit
    );
    for request in &page.requests {
        let status = request.status.to_string();
        let preview: String = request
            .extracted_text
            .as_deref()
            .unwrap_or("-")
            .chars()
            .take(40)
            .collect();
        println!(
            "{}  {}  {status:<10}  {:>6.2}s  {preview}",
            request.request_id,
            request.created_at.format("%Y-%m-%d %H:%M"),
            request.processing_time_total,
        );
    }
}
