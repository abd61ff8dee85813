//! WAV container invariants, verified independently with hound.

use std::io::Cursor;

use wavextract::audio::{PcmBuffer, WavWriter};

fn le_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

#[test]
fn chunk_sizes_are_exact_for_varied_buffers() {
    let cases = [
        (1u32, 8000u32, 1usize),
        (1, 8000, 8000),
        (2, 44100, 4410),
        (2, 48000, 1),
        (6, 48000, 480),
    ];

    for (channels, rate, frames) in cases {
        let pcm = PcmBuffer {
            channel_count: channels,
            sample_rate: rate,
            interleaved_samples: vec![0i16; frames * channels as usize],
        };
        let bytes = WavWriter::new().write(&pcm).unwrap();
        let data_size = (frames as u32) * channels * 2;

        assert_eq!(le_u32(&bytes, 4), 36 + data_size, "ChunkSize for {:?}", (channels, rate, frames));
        assert_eq!(le_u32(&bytes, 40), data_size, "Subchunk2Size for {:?}", (channels, rate, frames));
        assert_eq!(bytes.len(), 44 + data_size as usize);
    }
}

#[test]
fn mono_one_second_8khz_silence_is_16044_bytes() {
    let pcm = PcmBuffer {
        channel_count: 1,
        sample_rate: 8000,
        interleaved_samples: vec![0i16; 8000],
    };
    let bytes = WavWriter::new().write(&pcm).unwrap();
    assert_eq!(le_u32(&bytes, 40), 16000);
    assert_eq!(bytes.len(), 16044);
}

#[test]
fn hound_reads_back_identical_samples() {
    let samples: Vec<i16> = vec![0, 1, -1, 32767, -32768, 1234, -4321, 100, -100, 0];
    let pcm = PcmBuffer {
        channel_count: 2,
        sample_rate: 44100,
        interleaved_samples: samples.clone(),
    };
    let bytes = WavWriter::new().write(&pcm).unwrap();

    let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 44100);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_format, hound::SampleFormat::Int);

    let read_back: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(read_back, samples);
}

#[test]
fn header_is_byte_identical_to_reference() {
    let pcm = PcmBuffer {
        channel_count: 1,
        sample_rate: 8000,
        interleaved_samples: vec![0i16; 2],
    };
    let bytes = WavWriter::new().write(&pcm).unwrap();

    #[rustfmt::skip]
    let expected: [u8; 48] = [
        b'R', b'I', b'F', b'F', 40, 0, 0, 0, b'W', b'A', b'V', b'E',
        b'f', b'm', b't', b' ', 16, 0, 0, 0,
        1, 0,               // PCM
        1, 0,               // mono
        0x40, 0x1F, 0, 0,   // 8000 Hz
        0x80, 0x3E, 0, 0,   // byte rate 16000
        2, 0,               // block align
        16, 0,              // bits per sample
        b'd', b'a', b't', b'a', 4, 0, 0, 0,
        0, 0, 0, 0,
    ];
    assert_eq!(bytes.as_slice(), expected.as_slice());
}
