// Code generated by richsig-gen. DO NOT EDIT.
// Source crate: wire_fmt
#![allow(unused_mut, unused_variables, clippy::all)]

// These types must implement richsig::Fill (#[derive(richsig::Fill)] on structs):
//   wire_fmt::frame::Frame

pub fn fuzz_checksum(fuzz_data: &[u8]) -> i32 {
    wire_fmt::checksum(fuzz_data)
}

pub fn fuzz_frame_encoded_len(fuzz_data: &[u8]) -> i32 {
    let mut fuzz_stream = ::richsig::EntropyStream::new(fuzz_data);
    let frame1: wire_fmt::frame::Frame = ::richsig::Fill::fill(&mut fuzz_stream);
    let _ = frame1.encoded_len();
    0
}

pub fn fuzz_frame_new(fuzz_data: &[u8]) -> i32 {
    let mut fuzz_stream = ::richsig::EntropyStream::new(fuzz_data);
    let kind: u8 = ::richsig::Fill::fill(&mut fuzz_stream);
    let payload: Vec<u8> = ::richsig::Fill::fill(&mut fuzz_stream);
    let _ = wire_fmt::frame::Frame::new(kind, payload);
    0
}

pub fn fuzz_frame_read_from(fuzz_data: &[u8]) -> i32 {
    let mut fuzz_stream = ::richsig::EntropyStream::new(fuzz_data);
    let reader = ::std::io::Cursor::new(<::std::vec::Vec<u8> as ::richsig::Fill>::fill(&mut fuzz_stream));
    let _ = wire_fmt::frame::Frame::read_from(reader);
    0
}

// skipping fuzz_frame_visit because parameters include traits or functions without a substitution: &dyn Fn(u8)

pub fn fuzz_split(fuzz_data: &[u8]) -> i32 {
    let mut fuzz_stream = ::richsig::EntropyStream::new(fuzz_data);
    let frame1: wire_fmt::frame::Frame = ::richsig::Fill::fill(&mut fuzz_stream);
    let at: usize = ::richsig::Fill::fill(&mut fuzz_stream);
    let _ = wire_fmt::frame::split(&frame1, at);
    0
}

pub fn fuzz_parse_header(fuzz_data: &[u8]) -> i32 {
    let mut fuzz_stream = ::richsig::EntropyStream::new(fuzz_data);
    let name: String = ::richsig::Fill::fill(&mut fuzz_stream);
    let version: Option<u8> = ::richsig::Fill::fill(&mut fuzz_stream);
    let strict: bool = ::richsig::Fill::fill(&mut fuzz_stream);
    if version.is_none() {
        return 0;
    }
    let _ = wire_fmt::parse_header(&name, version, strict);
    0
}
