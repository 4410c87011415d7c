#![no_main]

use cachalot::image::ProgramImage;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must load or fail cleanly, never panic.
    if let Ok(image) = ProgramImage::parse(data, 0) {
        let listing = image.disassemble();
        assert_eq!(listing.len(), image.word_count());
    }
});
