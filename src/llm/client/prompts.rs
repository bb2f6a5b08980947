//! Prompt templates for OCR correction.

/// Default prompt for correcting one chunk of OCR output.
///
/// Written in Vietnamese to match the language of the text it corrects.
///
/// `{content}` is replaced with the chunk text.
pub const DEFAULT_CORRECTION_PROMPT: &str = r#"Đây là đoạn txt được OCR từ file ảnh chụp sách bị sai chính tả, giúp tôi sửa lại. Giữ nguyên các dấu xuống dòng và định dạng gốc của văn bản, đặc biệt là các dấu ngắt trang (ví dụ: '======...======' và 'TRANG n'). Không thêm bất kỳ bình luận hay giải thích nào ngoài nội dung đã sửa.

Nội dung cần sửa:
---
{content}
---"#;

/// Fill a correction template with a chunk of text.
pub fn build_correction_prompt(template: &str, content: &str) -> String {
    template.replace("{content}", content)
}
