// Sample knowledge-base PDF used by the scenario tests and the
// make_sample_pdf helper binary.

use crate::error::RagError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::Path;

/// Lines of the sample claims FAQ document
pub const SAMPLE_LINES: &[&str] = &[
    "This is a sample PDF document for testing the RAG system.",
    "",
    "Q: How do I file a claim?",
    "A: To file a claim, you can visit our website and click on the 'File a Claim' button. Follow the instructions to submit your claim online.",
    "",
    "Q: What documents do I need to provide?",
    "A: You will need to provide a copy of your ID, proof of purchase, and any relevant photos or documentation related to your claim.",
    "",
    "Q: How long does the claims process take?",
    "A: The claims process typically takes 5-7 business days, but it may vary depending on the complexity of the claim and the volume of claims we are processing.",
];

/// Build the sample PDF in memory
pub fn sample_pdf_bytes() -> Result<Vec<u8>, RagError> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 10.into()]),
        Operation::new("TL", vec![14.into()]),
        Operation::new("Td", vec![40.into(), 750.into()]),
    ];
    for line in SAMPLE_LINES {
        if !line.is_empty() {
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(*line)],
            ));
        }
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations };
    let encoded = content
        .encode()
        .map_err(|e| RagError::Pdf(format!("failed to encode page content: {}", e)))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| RagError::Pdf(format!("failed to serialize PDF: {}", e)))?;
    Ok(buffer)
}

/// Write the sample PDF to disk
pub fn write_sample_pdf(path: &Path) -> Result<(), RagError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    let bytes = sample_pdf_bytes()?;
    std::fs::write(path, bytes)?;
    Ok(())
}
