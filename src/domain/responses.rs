//! Canned replies, one per category.
//!
//! The table is an exhaustive match: adding a category without a reply fails to compile.

use crate::domain::{CannedResponse, Category, MediaPayload};

const SALE: CannedResponse = CannedResponse {
    text: "Gracias por su interés en nuestra opción de venta.",
    media: MediaPayload::Image {
        url: "https://samplelib.com/lib/preview/jpg/sample-5s.jpg",
        caption: "Imagen de venta",
    },
};

const RENTAL: CannedResponse = CannedResponse {
    text: "Gracias por consultar por alquiler.",
    media: MediaPayload::Video {
        url: "https://samplelib.com/lib/preview/mp4/sample-5s.mp4",
        caption: "Video de alquiler",
    },
};

const OTHER: CannedResponse = CannedResponse {
    text: "Gracias por contactarnos. En breve responderemos.",
    media: MediaPayload::Document {
        url: "https://samplelib.com/lib/preview/pdf/sample-5s.pdf",
        mime_type: "application/pdf",
        file_name: "informacion.pdf",
    },
};

/// Look up the reply for a category. Total: never fails.
pub fn canned_response(category: Category) -> &'static CannedResponse {
    match category {
        Category::Sale => &SALE,
        Category::Rental => &RENTAL,
        Category::Other => &OTHER,
    }
}
