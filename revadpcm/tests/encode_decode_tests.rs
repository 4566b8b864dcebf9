#[cfg(test)]
mod tests {
    use revadpcm::audio::{mix_to_mono, write_wav_to_bytes};
    use revadpcm::{
        build_table, codebook_from_aifc, decode_to_samples, decode_to_wav, default_codebook,
        encode_from_samples, get_aifc_info, validate_aifc, CodecConfig, EncodeOptions,
    };

    fn sine(len: usize, sample_rate: u32) -> Vec<i16> {
        (0..len)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                ((t * 440.0 * 2.0 * std::f32::consts::PI).sin() * 8000.0) as i16
            })
            .collect()
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let sample_rate = 22050;
        let samples = sine(sample_rate as usize / 2, sample_rate);

        let aifc_bytes = encode_from_samples(
            &samples,
            sample_rate,
            EncodeOptions::vadpcm(default_codebook().unwrap()),
        )
        .unwrap();

        let (decoded, decoded_sr) = decode_to_samples(&aifc_bytes, &CodecConfig::new()).unwrap();

        assert_eq!(decoded_sr, sample_rate);
        assert_eq!(decoded.len(), samples.len());

        // zero codebook: each sample lands within half a quantizer step of its frame peak
        for (original, decoded) in samples.chunks(16).zip(decoded.chunks(16)) {
            let peak = original.iter().map(|&s| (s as i32).abs()).max().unwrap_or(0);
            let bound = (peak as f64 * 0.55).max(2.0);
            for (&a, &b) in original.iter().zip(decoded.iter()) {
                assert!(((a as i32 - b as i32).abs() as f64) <= bound);
            }
        }
    }

    #[test]
    fn test_raw_round_trip_exact() {
        let samples = sine(1000, 16000);
        let aifc_bytes = encode_from_samples(&samples, 16000, EncodeOptions::raw()).unwrap();
        let (decoded, sr) = decode_to_samples(&aifc_bytes, &CodecConfig::new()).unwrap();
        assert_eq!(sr, 16000);
        assert_eq!(decoded, samples);
    }

    #[test]
    fn test_loop_expands_on_decode() {
        let samples = sine(320, 16000);
        let options = EncodeOptions::raw().with_loop(100, 200, 2);
        let aifc_bytes = encode_from_samples(&samples, 16000, options).unwrap();

        let info = get_aifc_info(&aifc_bytes).unwrap();
        assert!(info.has_loop);
        assert_eq!(info.loop_count, 2);

        let (decoded, _) = decode_to_samples(&aifc_bytes, &CodecConfig::new()).unwrap();
        assert_eq!(decoded.len(), 320 + 2 * 100);
        assert_eq!(&decoded[..200], &samples[..200]);
        assert_eq!(&decoded[200..300], &samples[100..200]);
        assert_eq!(&decoded[400..], &samples[200..]);
    }

    #[test]
    fn test_infinite_loop_needs_repeats() {
        let samples = sine(64, 8000);
        let options = EncodeOptions::raw().with_loop(0, 32, -1);
        let aifc_bytes = encode_from_samples(&samples, 8000, options).unwrap();

        assert!(decode_to_samples(&aifc_bytes, &CodecConfig::new()).is_err());

        let config = CodecConfig::new().with_infinite_loop_repeats(1);
        let (decoded, _) = decode_to_samples(&aifc_bytes, &config).unwrap();
        assert_eq!(decoded.len(), 64 + 32);
    }

    #[test]
    fn test_wav_output() {
        let samples = sine(100, 22050);
        let aifc_bytes = encode_from_samples(&samples, 22050, EncodeOptions::raw()).unwrap();
        let wav = decode_to_wav(&aifc_bytes, &CodecConfig::new()).unwrap();

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(u16::from_le_bytes([wav[22], wav[23]]), 1);
        assert_eq!(
            u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]),
            22050
        );
        assert_eq!(
            u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]),
            200
        );
        assert_eq!(wav.len(), 44 + 200);
        assert_eq!(i16::from_le_bytes([wav[46], wav[47]]), samples[1]);
    }

    #[test]
    fn test_wav_header_empty() {
        let wav = write_wav_to_bytes(&[], 8000).unwrap();
        assert_eq!(wav.len(), 44);
        assert_eq!(u32::from_le_bytes([wav[4], wav[5], wav[6], wav[7]]), 36);
    }

    #[test]
    fn test_mix_to_mono() {
        let mixed = mix_to_mono(&[0.5, -0.5, 0.25, 0.25, 1.0, 1.0], 2);
        assert_eq!(mixed, vec![0, 8192, i16::MAX]);

        let mono = mix_to_mono(&[0.5, -0.25], 1);
        assert_eq!(mono, vec![16384, -8192]);
    }

    #[test]
    fn test_codebook_from_aifc() {
        let compressed = encode_from_samples(
            &sine(64, 8000),
            8000,
            EncodeOptions::vadpcm(default_codebook().unwrap()),
        )
        .unwrap();
        let codebook = codebook_from_aifc(&compressed).unwrap();
        assert_eq!(codebook.order(), 2);
        assert_eq!(codebook.predictors(), 1);

        let raw = encode_from_samples(&sine(64, 8000), 8000, EncodeOptions::raw()).unwrap();
        assert!(codebook_from_aifc(&raw).is_err());
    }

    #[test]
    fn test_validate_aifc() {
        let aifc_bytes = encode_from_samples(&sine(64, 8000), 8000, EncodeOptions::raw()).unwrap();
        assert!(validate_aifc(&aifc_bytes).unwrap());
        assert!(!validate_aifc(b"RIFF....WAVE").unwrap());
    }

    #[test]
    fn test_build_table() {
        let a = encode_from_samples(&sine(48, 8000), 8000, EncodeOptions::raw()).unwrap();
        let b = encode_from_samples(
            &sine(40, 8000),
            8000,
            EncodeOptions::vadpcm(default_codebook().unwrap()),
        )
        .unwrap();

        let (data, entries) = build_table(&[a.clone(), b, a]).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].offset, 0);
        assert_eq!(entries[0].length, 96);
        assert_eq!(entries[1].offset, 96);
        assert_eq!(entries[1].length, 27);
        assert_eq!(entries[2], entries[0]);
        assert_eq!(data.len(), 96 + 27);

        assert!(build_table(&[b"junk".to_vec()]).is_err());
    }
}
