//! State-machine tests for the per-column page writer and the store,
//! driven through a mock file writer that records every call and simulates
//! the file position.

use std::collections::HashSet;
use std::io::Cursor;
use std::sync::Arc;

use crate::allocator::HeapAllocator;
use crate::bridge::file_writer::ChunkFileWriter;
use crate::chunk::store::PageWriteStore;
use crate::codec::{BytesCompressor, CodecName, Uncompressed, ZstdCompressor};
use crate::encoding::dictionary::{DictIdReader, DictIdWriter, DictionaryEntries};
use crate::encoding::levels::encode_levels;
use crate::encoding::Encoding;
use crate::error::ColpressError;
use crate::kernels::plain;
use crate::page::header::{PageHeader, PageHeaderCodec, PageHeaderKind, PageHeaderWithOffset};
use crate::page::holder::{PageHolder, PageV1Holder};
use crate::page::DictionaryPage;
use crate::schema::{ColumnDescriptor, MessageSchema};
use crate::statistics::Statistics;
use crate::types::PhysicalType;

//==================================================================================
// 1. Mock file writer
//==================================================================================

#[derive(Debug)]
enum Event {
    StartColumn {
        path: String,
        total_value_count: u64,
        codec: CodecName,
    },
    DictionaryPage {
        header_len: usize,
        body: Vec<u8>,
        num_entries: u32,
        encoding: Encoding,
        sorted: bool,
    },
    DataPages {
        bytes: Vec<u8>,
        uncompressed_length: u64,
        compressed_length: u64,
        data_encodings: Vec<Encoding>,
        page_headers: Vec<PageHeaderWithOffset>,
    },
    EndColumn,
}

struct MockFileWriter {
    pos: u64,
    header_codec: PageHeaderCodec,
    events: Vec<Event>,
}

impl MockFileWriter {
    fn new() -> Self {
        Self::at(0)
    }

    fn at(pos: u64) -> Self {
        Self {
            pos,
            header_codec: PageHeaderCodec::new(),
            events: Vec::new(),
        }
    }

    fn data_pages(&self) -> &Event {
        self.events
            .iter()
            .find(|e| matches!(e, Event::DataPages { .. }))
            .expect("no DataPages event recorded")
    }

    fn dictionary_event(&self) -> Option<&Event> {
        self.events
            .iter()
            .find(|e| matches!(e, Event::DictionaryPage { .. }))
    }

    fn ended(&self) -> bool {
        self.events.iter().any(|e| matches!(e, Event::EndColumn))
    }
}

impl ChunkFileWriter for MockFileWriter {
    fn pos(&self) -> u64 {
        self.pos
    }

    fn start_column(
        &mut self,
        descriptor: &ColumnDescriptor,
        total_value_count: u64,
        codec: CodecName,
    ) -> Result<(), ColpressError> {
        self.events.push(Event::StartColumn {
            path: descriptor.path().to_string(),
            total_value_count,
            codec,
        });
        Ok(())
    }

    fn write_dictionary_page(
        &mut self,
        page: DictionaryPage,
        sorted: bool,
    ) -> Result<(), ColpressError> {
        let mut header = Vec::new();
        self.header_codec.write_dictionary_page_header(
            page.uncompressed_size(),
            page.bytes().len() as u64,
            page.num_entries(),
            page.encoding(),
            sorted,
            &mut header,
        )?;
        self.pos += (header.len() + page.bytes().len()) as u64;
        self.events.push(Event::DictionaryPage {
            header_len: header.len(),
            body: page.bytes().to_vec(),
            num_entries: page.num_entries(),
            encoding: page.encoding(),
            sorted,
        });
        Ok(())
    }

    fn write_data_pages(
        &mut self,
        bytes: Vec<u8>,
        uncompressed_length: u64,
        compressed_length: u64,
        _statistics: &Statistics,
        _rl_encodings: &HashSet<Encoding>,
        _dl_encodings: &HashSet<Encoding>,
        data_encodings: &[Encoding],
        page_headers: Vec<PageHeaderWithOffset>,
    ) -> Result<(), ColpressError> {
        self.pos += bytes.len() as u64;
        self.events.push(Event::DataPages {
            bytes,
            uncompressed_length,
            compressed_length,
            data_encodings: data_encodings.to_vec(),
            page_headers,
        });
        Ok(())
    }

    fn end_column(&mut self) -> Result<(), ColpressError> {
        self.events.push(Event::EndColumn);
        Ok(())
    }
}

//==================================================================================
// 2. Test helpers
//==================================================================================

fn int32_stats(values: &[i32]) -> Statistics {
    let mut stats = Statistics::new_for(PhysicalType::Int32);
    for &v in values {
        stats.update_i32(v);
    }
    stats
}

fn dict_page_i32(entries: &[i32]) -> DictionaryPage {
    let bytes = DictionaryEntries::Int32(entries.to_vec()).to_plain_bytes();
    let len = bytes.len() as u64;
    DictionaryPage::new(bytes, len, entries.len() as u32, Encoding::PlainDictionary)
}

fn dict_ids(ids: &[u32], num_entries: u32) -> Vec<u8> {
    let mut writer = DictIdWriter::new();
    for &id in ids {
        writer.put(id);
    }
    writer.into_bytes(num_entries).unwrap()
}

fn read_ids(body: &[u8], count: usize) -> Vec<u32> {
    let mut reader = DictIdReader::new(body, count).unwrap();
    (0..count).map(|_| reader.read_id().unwrap()).collect()
}

fn plain_i32_body(values: &[i32]) -> Vec<u8> {
    let mut out = Vec::new();
    plain::encode_fixed(values, &mut out);
    out
}

/// Parses a concatenated `[header][body]...` stream back into pages.
fn parse_pages(blob: &[u8]) -> Vec<(PageHeader, Vec<u8>)> {
    let codec = PageHeaderCodec::new();
    let mut cursor = Cursor::new(blob);
    let mut pages = Vec::new();
    while (cursor.position() as usize) < blob.len() {
        let header = codec.read_header(&mut cursor).unwrap();
        let start = cursor.position() as usize;
        let end = start + header.compressed_page_size as usize;
        pages.push((header.clone(), blob[start..end].to_vec()));
        cursor.set_position(end as u64);
    }
    pages
}

fn int32_store(compressor: Arc<dyn BytesCompressor>) -> (PageWriteStore, ColumnDescriptor) {
    let descriptor = ColumnDescriptor::required("x", PhysicalType::Int32);
    let schema = MessageSchema::new(vec![descriptor.clone()]);
    let store = PageWriteStore::new(compressor, schema, Arc::new(HeapAllocator::new()));
    (store, descriptor)
}

//==================================================================================
// 3. Scenarios
//==================================================================================

// All pages dictionary-encoded: the dictionary is kept, sorted, and every
// page's ids are remapped.
#[test]
fn test_all_dictionary_pages_keep_and_sort_dictionary() {
    let (mut store, descriptor) = int32_store(Arc::new(Uncompressed));
    let writer = store.page_writer_mut(&descriptor).unwrap();

    writer.write_dictionary_page(dict_page_i32(&[7, 3, 5])).unwrap();
    writer
        .write_page(
            dict_ids(&[0, 1, 2], 3),
            3,
            int32_stats(&[7, 3, 5]),
            Encoding::Rle,
            Encoding::Rle,
            Encoding::PlainDictionary,
        )
        .unwrap();
    writer
        .write_page(
            dict_ids(&[2, 0], 3),
            2,
            int32_stats(&[5, 7]),
            Encoding::Rle,
            Encoding::Rle,
            Encoding::PlainDictionary,
        )
        .unwrap();

    let mut mock = MockFileWriter::new();
    store.flush_to_file_writer(&mut mock).unwrap();

    let Some(Event::DictionaryPage {
        body,
        num_entries,
        encoding,
        sorted,
        ..
    }) = mock.dictionary_event()
    else {
        panic!("expected a dictionary page");
    };
    assert!(*sorted);
    assert_eq!(*num_entries, 3);
    assert_eq!(*encoding, Encoding::PlainDictionary);
    let entries =
        DictionaryEntries::from_plain_bytes(body, PhysicalType::Int32, 3).unwrap();
    assert_eq!(entries, DictionaryEntries::Int32(vec![3, 5, 7]));

    let Event::DataPages {
        bytes,
        data_encodings,
        ..
    } = mock.data_pages()
    else {
        unreachable!()
    };
    // The dictionary page's own encoding leads the data encodings list.
    assert_eq!(
        data_encodings,
        &vec![
            Encoding::PlainDictionary,
            Encoding::PlainDictionary,
            Encoding::PlainDictionary
        ]
    );

    let pages = parse_pages(bytes);
    assert_eq!(pages.len(), 2);
    assert_eq!(read_ids(&pages[0].1, 3), vec![2, 0, 1]);
    assert_eq!(read_ids(&pages[1].1, 2), vec![1, 2]);
}

// One page fell back to plain: the dictionary is abandoned and the
// dictionary-encoded page is rewritten; the plain page is untouched.
#[test]
fn test_mixed_encodings_trigger_dictionary_fallback() {
    let (mut store, descriptor) = int32_store(Arc::new(Uncompressed));
    let writer = store.page_writer_mut(&descriptor).unwrap();

    writer.write_dictionary_page(dict_page_i32(&[42, 99])).unwrap();
    writer
        .write_page(
            dict_ids(&[0, 1], 2),
            2,
            int32_stats(&[42, 99]),
            Encoding::Rle,
            Encoding::Rle,
            Encoding::PlainDictionary,
        )
        .unwrap();
    writer
        .write_page(
            plain_i32_body(&[100, 101]),
            2,
            int32_stats(&[100, 101]),
            Encoding::Rle,
            Encoding::Rle,
            Encoding::Plain,
        )
        .unwrap();

    let mut mock = MockFileWriter::new();
    store.flush_to_file_writer(&mut mock).unwrap();

    assert!(mock.dictionary_event().is_none());

    let Event::DataPages {
        bytes,
        data_encodings,
        ..
    } = mock.data_pages()
    else {
        unreachable!()
    };
    assert_eq!(data_encodings, &vec![Encoding::Plain, Encoding::Plain]);

    let pages = parse_pages(bytes);
    assert_eq!(pages.len(), 2);

    let decoded_a: Vec<i32> = plain::decode_fixed(&pages[0].1, 2).unwrap();
    assert_eq!(decoded_a, vec![42, 99]);
    let decoded_b: Vec<i32> = plain::decode_fixed(&pages[1].1, 2).unwrap();
    assert_eq!(decoded_b, vec![100, 101]);
}

// V2 page with nulls, dictionary kept: ids are remapped against the sorted
// dictionary and the level streams are emitted verbatim.
#[test]
fn test_v2_page_with_nulls_sorts_dictionary() {
    let descriptor = ColumnDescriptor::optional("x", PhysicalType::Int64);
    let schema = MessageSchema::new(vec![descriptor.clone()]);
    let mut store =
        PageWriteStore::new(Arc::new(Uncompressed), schema, Arc::new(HeapAllocator::new()));
    let writer = store.page_writer_mut(&descriptor).unwrap();

    let entries = DictionaryEntries::Int64(vec![30, 10, 20]);
    let dict_bytes = entries.to_plain_bytes();
    let dict_len = dict_bytes.len() as u64;
    writer
        .write_dictionary_page(DictionaryPage::new(
            dict_bytes,
            dict_len,
            3,
            Encoding::RleDictionary,
        ))
        .unwrap();

    // Logical stream [10, null, 20, null, 30]: positions 1 and 3 are null.
    let def_levels = encode_levels(&[1u16, 0, 1, 0, 1]).unwrap();
    let mut stats = Statistics::new_for(PhysicalType::Int64);
    stats.update_i64(10);
    stats.update_i64(30);
    stats.increment_null_count(2);

    writer
        .write_page_v2(
            5,
            2,
            5,
            Vec::new(),
            def_levels.clone(),
            Encoding::RleDictionary,
            dict_ids(&[1, 2, 0], 3),
            stats,
        )
        .unwrap();

    let mut mock = MockFileWriter::new();
    store.flush_to_file_writer(&mut mock).unwrap();

    let Some(Event::DictionaryPage { body, .. }) = mock.dictionary_event() else {
        panic!("expected a dictionary page");
    };
    let sorted_entries =
        DictionaryEntries::from_plain_bytes(body, PhysicalType::Int64, 3).unwrap();
    assert_eq!(sorted_entries, DictionaryEntries::Int64(vec![10, 20, 30]));

    let Event::DataPages { bytes, .. } = mock.data_pages() else {
        unreachable!()
    };
    let pages = parse_pages(bytes);
    assert_eq!(pages.len(), 1);
    let (header, body) = &pages[0];
    let PageHeaderKind::DataV2 {
        value_count,
        null_count,
        row_count,
        rl_byte_len,
        dl_byte_len,
        ..
    } = &header.kind
    else {
        panic!("expected a v2 header");
    };
    assert_eq!((*value_count, *null_count, *row_count), (5, 2, 5));
    assert_eq!(*rl_byte_len, 0);
    assert_eq!(*dl_byte_len as usize, def_levels.len());

    // Body layout is [rl][dl][values]; the levels were emitted verbatim.
    assert_eq!(&body[..def_levels.len()], &def_levels[..]);
    let values = &body[def_levels.len()..];
    assert_eq!(read_ids(values, 3), vec![0, 1, 2]);
}

// Offset accounting: every recorded offset equals the absolute position at
// which that page's body begins.
#[test]
fn test_recorded_offsets_match_on_disk_layout() {
    let (mut store, descriptor) = int32_store(Arc::new(Uncompressed));
    let writer = store.page_writer_mut(&descriptor).unwrap();

    writer.write_dictionary_page(dict_page_i32(&[7, 3, 5])).unwrap();
    writer
        .write_page(
            dict_ids(&[0, 1, 2], 3),
            3,
            int32_stats(&[7, 3, 5]),
            Encoding::Rle,
            Encoding::Rle,
            Encoding::PlainDictionary,
        )
        .unwrap();
    writer
        .write_page(
            dict_ids(&[2, 0, 1, 1], 3),
            4,
            int32_stats(&[5, 7, 3, 3]),
            Encoding::Rle,
            Encoding::Rle,
            Encoding::PlainDictionary,
        )
        .unwrap();

    let mut mock = MockFileWriter::at(1000);
    store.flush_to_file_writer(&mut mock).unwrap();

    let Some(Event::DictionaryPage {
        header_len, body, ..
    }) = mock.dictionary_event()
    else {
        panic!("expected a dictionary page");
    };
    let mut expected_pos = 1000 + (*header_len + body.len()) as u64;

    let Event::DataPages {
        bytes,
        page_headers,
        ..
    } = mock.data_pages()
    else {
        unreachable!()
    };

    let codec = PageHeaderCodec::new();
    let mut cursor = Cursor::new(bytes.as_slice());
    for recorded in page_headers {
        let header_start = cursor.position();
        let header = codec.read_header(&mut cursor).unwrap();
        let header_len = cursor.position() - header_start;

        // Body begins right after the serialized header.
        assert_eq!(recorded.offset, expected_pos + header_len);
        assert_eq!(recorded.header, header);

        expected_pos = recorded.offset + header.compressed_page_size as u64;
        cursor.set_position(cursor.position() + header.compressed_page_size as u64);
    }
    assert_eq!(expected_pos, mock.pos());
}

// Size overflow: a page whose claimed uncompressed size crosses the 32-bit
// signed ceiling fails at frame time, after start_column but with no
// end_column.
#[test]
fn test_oversized_page_fails_at_emit() {
    let (mut store, descriptor) = int32_store(Arc::new(Uncompressed));
    let writer = store.page_writer_mut(&descriptor).unwrap();

    writer.push_holder_for_test(PageHolder::V1(PageV1Holder::new(
        Arc::new(descriptor.clone()),
        vec![0u8; 8],
        1,
        int32_stats(&[0]),
        Encoding::Rle,
        Encoding::Rle,
        Encoding::Plain,
        true,
        1u64 << 31,
    )));

    let mut mock = MockFileWriter::new();
    let result = store.flush_to_file_writer(&mut mock);
    assert!(matches!(result, Err(ColpressError::PageTooLarge(_))));
    assert!(matches!(mock.events.first(), Some(Event::StartColumn { .. })));
    assert!(!mock.ended());
}

#[test]
fn test_page_at_exact_size_boundary_succeeds() {
    let (mut store, descriptor) = int32_store(Arc::new(Uncompressed));
    let writer = store.page_writer_mut(&descriptor).unwrap();

    writer.push_holder_for_test(PageHolder::V1(PageV1Holder::new(
        Arc::new(descriptor.clone()),
        vec![0u8; 8],
        1,
        int32_stats(&[0]),
        Encoding::Rle,
        Encoding::Rle,
        Encoding::Plain,
        true,
        i32::MAX as u64,
    )));

    let mut mock = MockFileWriter::new();
    store.flush_to_file_writer(&mut mock).unwrap();

    let Event::DataPages { page_headers, .. } = mock.data_pages() else {
        unreachable!()
    };
    assert_eq!(page_headers[0].header.uncompressed_page_size, i32::MAX);
    assert!(mock.ended());
}

// Multi-column ordering: interleaved writes, but on disk all of A's pages
// precede all of B's, in schema order.
#[test]
fn test_multi_column_flush_preserves_schema_order() {
    let col_a = ColumnDescriptor::required("a", PhysicalType::Int32);
    let col_b = ColumnDescriptor::required("b", PhysicalType::ByteArray);
    let schema = MessageSchema::new(vec![col_a.clone(), col_b.clone()]);
    let mut store =
        PageWriteStore::new(Arc::new(Uncompressed), schema, Arc::new(HeapAllocator::new()));

    let mut byte_array_stats = Statistics::new_for(PhysicalType::ByteArray);
    byte_array_stats.update_bytes(b"b1");

    // Interleaved submission order: A1, B1, A2, B2.
    store
        .page_writer_mut(&col_a)
        .unwrap()
        .write_page(
            plain_i32_body(&[1]),
            1,
            int32_stats(&[1]),
            Encoding::Rle,
            Encoding::Rle,
            Encoding::Plain,
        )
        .unwrap();
    let mut b1 = Vec::new();
    plain::encode_byte_arrays(&[b"b1"], &mut b1);
    store
        .page_writer_mut(&col_b)
        .unwrap()
        .write_page(
            b1,
            1,
            byte_array_stats.clone(),
            Encoding::Rle,
            Encoding::Rle,
            Encoding::Plain,
        )
        .unwrap();
    store
        .page_writer_mut(&col_a)
        .unwrap()
        .write_page(
            plain_i32_body(&[2]),
            1,
            int32_stats(&[2]),
            Encoding::Rle,
            Encoding::Rle,
            Encoding::Plain,
        )
        .unwrap();
    let mut b2 = Vec::new();
    plain::encode_byte_arrays(&[b"b2"], &mut b2);
    store
        .page_writer_mut(&col_b)
        .unwrap()
        .write_page(
            b2,
            1,
            byte_array_stats,
            Encoding::Rle,
            Encoding::Rle,
            Encoding::Plain,
        )
        .unwrap();

    let mut mock = MockFileWriter::new();
    store.flush_to_file_writer(&mut mock).unwrap();

    let columns: Vec<&String> = mock
        .events
        .iter()
        .filter_map(|e| match e {
            Event::StartColumn { path, .. } => Some(path),
            _ => None,
        })
        .collect();
    assert_eq!(columns, vec!["a", "b"]);

    // Column A's chunk holds its two pages in submission order.
    let Event::DataPages { bytes, .. } = mock
        .events
        .iter()
        .find(|e| matches!(e, Event::DataPages { .. }))
        .unwrap()
    else {
        unreachable!()
    };
    let pages = parse_pages(bytes);
    assert_eq!(pages.len(), 2);
    let first: Vec<i32> = plain::decode_fixed(&pages[0].1, 1).unwrap();
    let second: Vec<i32> = plain::decode_fixed(&pages[1].1, 1).unwrap();
    assert_eq!((first[0], second[0]), (1, 2));
}

//==================================================================================
// 4. Boundary behaviors & invariants
//==================================================================================

#[test]
fn test_duplicate_dictionary_page_rejected() {
    let (mut store, descriptor) = int32_store(Arc::new(Uncompressed));
    let writer = store.page_writer_mut(&descriptor).unwrap();

    writer.write_dictionary_page(dict_page_i32(&[7, 3, 5])).unwrap();
    let result = writer.write_dictionary_page(dict_page_i32(&[1, 2]));
    assert!(matches!(result, Err(ColpressError::DuplicateDictionary)));

    // State unchanged: the first dictionary is the one emitted.
    let mut mock = MockFileWriter::new();
    store.flush_to_file_writer(&mut mock).unwrap();
    let Some(Event::DictionaryPage {
        body, num_entries, ..
    }) = mock.dictionary_event()
    else {
        panic!("expected a dictionary page");
    };
    assert_eq!(*num_entries, 3);
    let entries =
        DictionaryEntries::from_plain_bytes(body, PhysicalType::Int32, 3).unwrap();
    assert_eq!(entries, DictionaryEntries::Int32(vec![3, 5, 7]));
}

#[test]
fn test_zero_pages_no_dictionary_emits_empty_chunk() {
    let (mut store, _descriptor) = int32_store(Arc::new(Uncompressed));

    let mut mock = MockFileWriter::new();
    store.flush_to_file_writer(&mut mock).unwrap();

    assert!(matches!(
        mock.events.first(),
        Some(Event::StartColumn {
            total_value_count: 0,
            ..
        })
    ));
    assert!(mock.dictionary_event().is_none());
    let Event::DataPages {
        bytes,
        page_headers,
        ..
    } = mock.data_pages()
    else {
        unreachable!()
    };
    assert!(bytes.is_empty());
    assert!(page_headers.is_empty());
    assert!(mock.ended());
}

// With zero data pages the all-pages-dictionary flag holds vacuously, so a
// buffered dictionary is still emitted (sorted).
#[test]
fn test_dictionary_with_zero_pages_is_emitted() {
    let (mut store, descriptor) = int32_store(Arc::new(Uncompressed));
    store
        .page_writer_mut(&descriptor)
        .unwrap()
        .write_dictionary_page(dict_page_i32(&[9, 4]))
        .unwrap();

    let mut mock = MockFileWriter::new();
    store.flush_to_file_writer(&mut mock).unwrap();

    let Some(Event::DictionaryPage { body, sorted, .. }) = mock.dictionary_event() else {
        panic!("expected a dictionary page");
    };
    assert!(*sorted);
    let entries =
        DictionaryEntries::from_plain_bytes(body, PhysicalType::Int32, 2).unwrap();
    assert_eq!(entries, DictionaryEntries::Int32(vec![4, 9]));
}

#[test]
fn test_aggregate_sums_match_headers() {
    let (mut store, descriptor) = int32_store(Arc::new(ZstdCompressor::default()));
    let writer = store.page_writer_mut(&descriptor).unwrap();

    writer
        .write_page(
            plain_i32_body(&[1, 2, 3, 4, 5, 6, 7, 8]),
            8,
            int32_stats(&[1, 2, 3, 4, 5, 6, 7, 8]),
            Encoding::Rle,
            Encoding::Rle,
            Encoding::Plain,
        )
        .unwrap();
    writer
        .write_page(
            plain_i32_body(&[9, 10]),
            2,
            int32_stats(&[9, 10]),
            Encoding::Rle,
            Encoding::Rle,
            Encoding::Plain,
        )
        .unwrap();

    let mut mock = MockFileWriter::new();
    store.flush_to_file_writer(&mut mock).unwrap();

    let Some(Event::StartColumn {
        total_value_count,
        codec,
        ..
    }) = mock.events.first()
    else {
        panic!("expected StartColumn first");
    };
    assert_eq!(*total_value_count, 10);
    assert_eq!(*codec, CodecName::Zstd);

    let Event::DataPages {
        bytes,
        uncompressed_length,
        compressed_length,
        page_headers,
        ..
    } = mock.data_pages()
    else {
        unreachable!()
    };

    let header_uncompressed: u64 = page_headers
        .iter()
        .map(|h| h.header.uncompressed_page_size as u64)
        .sum();
    let header_compressed: u64 = page_headers
        .iter()
        .map(|h| h.header.compressed_page_size as u64)
        .sum();
    assert_eq!(*uncompressed_length, header_uncompressed);
    assert_eq!(*compressed_length, header_compressed);
    assert_eq!(header_uncompressed, 8 * 4 + 2 * 4);

    // The concatenated stream parses cleanly into exactly the framed pages.
    assert_eq!(parse_pages(bytes).len(), 2);
}

#[test]
fn test_allocator_buffers_released_after_flush() {
    let allocator = Arc::new(HeapAllocator::new());
    let descriptor = ColumnDescriptor::required("x", PhysicalType::Int32);
    let schema = MessageSchema::new(vec![descriptor.clone()]);
    let mut store = PageWriteStore::new(Arc::new(Uncompressed), schema, allocator.clone());

    let writer = store.page_writer_mut(&descriptor).unwrap();
    writer.write_dictionary_page(dict_page_i32(&[7, 3, 5])).unwrap();
    writer
        .write_page(
            dict_ids(&[0, 1, 2], 3),
            3,
            int32_stats(&[7, 3, 5]),
            Encoding::Rle,
            Encoding::Rle,
            Encoding::PlainDictionary,
        )
        .unwrap();
    assert_eq!(allocator.outstanding(), 1);

    let mut mock = MockFileWriter::new();
    store.flush_to_file_writer(&mut mock).unwrap();
    assert_eq!(allocator.outstanding(), 0);
}

#[test]
fn test_page_writer_lookup_misses_unknown_column() {
    let (mut store, _descriptor) = int32_store(Arc::new(Uncompressed));
    let other = ColumnDescriptor::required("other", PhysicalType::Int64);
    assert!(store.page_writer_mut(&other).is_none());
}

#[test]
fn test_mem_size_tracks_buffered_bytes() {
    let (mut store, descriptor) = int32_store(Arc::new(Uncompressed));
    let writer = store.page_writer_mut(&descriptor).unwrap();
    assert_eq!(writer.mem_size(), 0);

    let body = plain_i32_body(&[1, 2, 3]);
    let body_len = body.len() as u64;
    writer
        .write_page(
            body,
            3,
            int32_stats(&[1, 2, 3]),
            Encoding::Rle,
            Encoding::Rle,
            Encoding::Plain,
        )
        .unwrap();
    assert_eq!(writer.mem_size(), body_len);
    assert_eq!(writer.allocated_size(), body_len);
}
