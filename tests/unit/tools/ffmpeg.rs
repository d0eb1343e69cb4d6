use super::*;
use crate::foundation::error::ErrorKind;

#[test]
fn parses_video_stream_and_duration() {
    let json = br#"{
        "streams": [
            {"codec_type": "audio", "codec_name": "aac"},
            {"codec_type": "video", "codec_name": "vp9", "width": 512, "height": 288}
        ],
        "format": {"duration": "2.960000"}
    }"#;
    let info = parse_probe_json(json).unwrap();
    assert_eq!((info.width, info.height), (512, 288));
    assert_eq!(info.codec_name.as_deref(), Some("vp9"));
    assert!((info.duration_secs.unwrap() - 2.96).abs() < 1e-9);
    assert_eq!(info.alpha_decoder(), Some("libvpx-vp9"));
}

#[test]
fn stream_duration_is_a_fallback() {
    let json = br#"{"streams": [{"codec_type": "video", "codec_name": "h264", "width": 2, "height": 2, "duration": "1.5"}]}"#;
    let info = parse_probe_json(json).unwrap();
    assert_eq!(info.duration_secs, Some(1.5));
    assert_eq!(info.alpha_decoder(), None);
}

#[test]
fn missing_video_stream_is_a_conversion_error() {
    let json = br#"{"streams": [{"codec_type": "audio"}], "format": {}}"#;
    let err = parse_probe_json(json).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conversion);

    let err = parse_probe_json(br#"{"streams": [{"codec_type": "video", "width": 0, "height": 10}]}"#)
        .unwrap_err();
    assert!(err.to_string().contains("dimensions"));

    assert!(parse_probe_json(b"not json").is_err());
}

#[test]
fn ffmpeg_command_starts_with_quiet_overwrite_flags() {
    let tools = MediaTools::new();
    let cmd = tools.ffmpeg_command();
    assert_eq!(
        cmd.arg_strings(),
        vec!["-y", "-hide_banner", "-loglevel", "error"]
    );
}

#[test]
fn tools_deserialize_with_defaults() {
    let tools: MediaTools = serde_json::from_str(r#"{"ffmpeg": "/opt/ffmpeg/bin/ffmpeg"}"#).unwrap();
    assert_eq!(tools.ffmpeg, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
    assert_eq!(tools.ffprobe, PathBuf::from("ffprobe"));
}
