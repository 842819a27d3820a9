//! Builders for synthetic AXML, DEX and APK bytes.
//!
//! Only compiled for tests and behind the `test-support` feature.

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Namespace URI of the `android:` attributes
pub const ANDROID_NS: &str = "http://schemas.android.com/apk/res/android";

const RES_XML_TYPE: u16 = 0x0003;
const RES_STRING_POOL_TYPE: u16 = 0x0001;
const RES_XML_START_NAMESPACE_TYPE: u16 = 0x0100;
const RES_XML_END_NAMESPACE_TYPE: u16 = 0x0101;
const RES_XML_START_ELEMENT_TYPE: u16 = 0x0102;
const RES_XML_END_ELEMENT_TYPE: u16 = 0x0103;
const TYPE_STRING: u8 = 0x03;
const TYPE_INT_DEC: u8 = 0x10;

const NO_ENTRY: u32 = 0xffff_ffff;

fn put_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn pad4(buf: &mut Vec<u8>) {
    while buf.len() % 4 != 0 {
        buf.push(0);
    }
}

struct Attr {
    ns: Option<String>,
    name: String,
    raw: Option<String>,
    data_type: u8,
    data: u32,
}

enum Node {
    StartNs { prefix: String, uri: String },
    EndNs { prefix: String, uri: String },
    Start { name: String, attrs: Vec<Attr> },
    End { name: String },
}

/// Emits a compiled XML document from a sequence of events.
#[derive(Default)]
pub struct AxmlBuilder {
    nodes: Vec<Node>,
}

impl AxmlBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_namespace(&mut self, prefix: &str, uri: &str) -> &mut Self {
        self.nodes.push(Node::StartNs {
            prefix: prefix.into(),
            uri: uri.into(),
        });
        self
    }

    pub fn end_namespace(&mut self, prefix: &str, uri: &str) -> &mut Self {
        self.nodes.push(Node::EndNs {
            prefix: prefix.into(),
            uri: uri.into(),
        });
        self
    }

    pub fn start_element(&mut self, name: &str) -> &mut Self {
        self.nodes.push(Node::Start {
            name: name.into(),
            attrs: Vec::new(),
        });
        self
    }

    pub fn end_element(&mut self, name: &str) -> &mut Self {
        self.nodes.push(Node::End { name: name.into() });
        self
    }

    fn push_attr(&mut self, attr: Attr) -> &mut Self {
        if let Some(Node::Start { attrs, .. }) = self
            .nodes
            .iter_mut()
            .rev()
            .find(|n| matches!(n, Node::Start { .. }))
        {
            attrs.push(attr);
        }
        self
    }

    /// String attribute on the most recently started element
    pub fn attr_string(&mut self, ns: Option<&str>, name: &str, value: &str) -> &mut Self {
        self.push_attr(Attr {
            ns: ns.map(str::to_string),
            name: name.into(),
            raw: Some(value.into()),
            data_type: TYPE_STRING,
            data: 0,
        })
    }

    /// Decimal integer attribute on the most recently started element
    pub fn attr_int(&mut self, ns: Option<&str>, name: &str, value: i32) -> &mut Self {
        self.push_attr(Attr {
            ns: ns.map(str::to_string),
            name: name.into(),
            raw: None,
            data_type: TYPE_INT_DEC,
            data: value as u32,
        })
    }

    fn intern(pool: &mut Vec<String>, s: &str) -> u32 {
        match pool.iter().position(|p| p == s) {
            Some(i) => i as u32,
            None => {
                pool.push(s.to_string());
                (pool.len() - 1) as u32
            }
        }
    }

    fn string_pool_chunk(pool: &[String]) -> Vec<u8> {
        let mut data = Vec::new();
        let mut offsets = Vec::with_capacity(pool.len());
        for s in pool {
            offsets.push(data.len() as u32);
            let units: Vec<u16> = s.encode_utf16().collect();
            put_u16(&mut data, units.len() as u16);
            for u in units {
                put_u16(&mut data, u);
            }
            put_u16(&mut data, 0);
        }
        pad4(&mut data);

        let header_size = 28u32;
        let mut chunk = Vec::new();
        put_u16(&mut chunk, RES_STRING_POOL_TYPE);
        put_u16(&mut chunk, header_size as u16);
        put_u32(&mut chunk, header_size + 4 * pool.len() as u32 + data.len() as u32);
        put_u32(&mut chunk, pool.len() as u32);
        put_u32(&mut chunk, 0);
        put_u32(&mut chunk, 0);
        put_u32(&mut chunk, header_size + 4 * pool.len() as u32);
        put_u32(&mut chunk, 0);
        for off in offsets {
            put_u32(&mut chunk, off);
        }
        chunk.extend_from_slice(&data);
        chunk
    }

    fn node_chunk(chunk_type: u16, body: &[u8]) -> Vec<u8> {
        let mut chunk = Vec::new();
        put_u16(&mut chunk, chunk_type);
        put_u16(&mut chunk, 16);
        put_u32(&mut chunk, 16 + body.len() as u32);
        put_u32(&mut chunk, 1);
        put_u32(&mut chunk, NO_ENTRY);
        chunk.extend_from_slice(body);
        chunk
    }

    /// Serialize the document
    pub fn build(&self) -> Vec<u8> {
        let mut pool = Vec::new();
        let mut idx = |s: Option<&str>| s.map_or(NO_ENTRY, |s| Self::intern(&mut pool, s));
        let mut nodes = Vec::new();

        for node in &self.nodes {
            let mut body = Vec::new();
            let chunk_type = match node {
                Node::StartNs { prefix, uri } | Node::EndNs { prefix, uri } => {
                    put_u32(&mut body, idx(Some(prefix.as_str())));
                    put_u32(&mut body, idx(Some(uri.as_str())));
                    if matches!(node, Node::StartNs { .. }) {
                        RES_XML_START_NAMESPACE_TYPE
                    } else {
                        RES_XML_END_NAMESPACE_TYPE
                    }
                }
                Node::Start { name, attrs } => {
                    put_u32(&mut body, NO_ENTRY);
                    put_u32(&mut body, idx(Some(name.as_str())));
                    put_u16(&mut body, 20);
                    put_u16(&mut body, 20);
                    put_u16(&mut body, attrs.len() as u16);
                    put_u16(&mut body, 0);
                    put_u16(&mut body, 0);
                    put_u16(&mut body, 0);
                    for attr in attrs {
                        put_u32(&mut body, idx(attr.ns.as_deref()));
                        put_u32(&mut body, idx(Some(attr.name.as_str())));
                        let raw = idx(attr.raw.as_deref());
                        put_u32(&mut body, raw);
                        put_u16(&mut body, 8);
                        body.push(0);
                        body.push(attr.data_type);
                        put_u32(&mut body, if attr.raw.is_some() { raw } else { attr.data });
                    }
                    RES_XML_START_ELEMENT_TYPE
                }
                Node::End { name } => {
                    put_u32(&mut body, NO_ENTRY);
                    put_u32(&mut body, idx(Some(name.as_str())));
                    RES_XML_END_ELEMENT_TYPE
                }
            };
            nodes.extend(Self::node_chunk(chunk_type, &body));
        }

        let pool_chunk = Self::string_pool_chunk(&pool);
        let mut doc = Vec::new();
        put_u16(&mut doc, RES_XML_TYPE);
        put_u16(&mut doc, 8);
        put_u32(&mut doc, (8 + pool_chunk.len() + nodes.len()) as u32);
        doc.extend(pool_chunk);
        doc.extend(nodes);
        doc
    }
}

/// A typical manifest: package, version, `uses-sdk`, and one `activity` per
/// entry. Activities flagged `true` get a MAIN/LAUNCHER intent filter.
pub fn sample_manifest(package: &str, activities: &[(&str, bool)]) -> Vec<u8> {
    let mut b = AxmlBuilder::new();
    b.start_namespace("android", ANDROID_NS);
    b.start_element("manifest")
        .attr_string(None, "package", package)
        .attr_int(Some(ANDROID_NS), "versionCode", 42)
        .attr_string(Some(ANDROID_NS), "versionName", "2.1.0");
    b.start_element("uses-sdk")
        .attr_int(Some(ANDROID_NS), "minSdkVersion", 21)
        .attr_int(Some(ANDROID_NS), "targetSdkVersion", 34);
    b.end_element("uses-sdk");
    b.start_element("application")
        .attr_string(Some(ANDROID_NS), "label", "Sample");
    for (name, launcher) in activities {
        b.start_element("activity").attr_string(Some(ANDROID_NS), "name", name);
        if *launcher {
            b.start_element("intent-filter");
            b.start_element("action")
                .attr_string(Some(ANDROID_NS), "name", "android.intent.action.MAIN");
            b.end_element("action");
            b.start_element("category")
                .attr_string(Some(ANDROID_NS), "name", "android.intent.category.LAUNCHER");
            b.end_element("category");
            b.end_element("intent-filter");
        }
        b.end_element("activity");
    }
    b.end_element("application");
    b.end_element("manifest");
    b.end_namespace("android", ANDROID_NS);
    b.build()
}

struct DexString {
    utf16_len: u32,
    data: Vec<u8>,
}

/// Emits a minimal DEX file with string, type and class tables and a map list.
#[derive(Default)]
pub struct DexBuilder {
    strings: Vec<DexString>,
    classes: Vec<String>,
}

impl DexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a string constant
    pub fn string(mut self, s: &str) -> Self {
        self.strings.push(DexString {
            utf16_len: s.encode_utf16().count() as u32,
            data: encode_mutf8(s),
        });
        self
    }

    /// Add string data verbatim, without checking that it is valid MUTF-8
    pub fn raw_string(mut self, utf16_len: u32, data: Vec<u8>) -> Self {
        self.strings.push(DexString { utf16_len, data });
        self
    }

    /// Define a class by descriptor, e.g. `Lcom/example/Foo;`
    pub fn class(mut self, descriptor: &str) -> Self {
        self.classes.push(descriptor.to_string());
        self
    }

    /// Serialize the file
    pub fn build(&self) -> Vec<u8> {
        const HEADER: u32 = 0x70;
        const TYPE_HEADER_ITEM: u16 = 0x0000;
        const TYPE_STRING_ID_ITEM: u16 = 0x0001;
        const TYPE_TYPE_ID_ITEM: u16 = 0x0002;
        const TYPE_CLASS_DEF_ITEM: u16 = 0x0006;
        const TYPE_MAP_LIST: u16 = 0x1000;
        const TYPE_STRING_DATA_ITEM: u16 = 0x2002;

        // string_ids are sorted by content, type_ids by string index
        let mut pool: Vec<(u32, Vec<u8>)> = Vec::new();
        let owned = self.classes.iter().map(|c| (c.encode_utf16().count() as u32, encode_mutf8(c)));
        for (len, data) in self
            .strings
            .iter()
            .map(|s| (s.utf16_len, s.data.clone()))
            .chain(owned)
        {
            if !pool.iter().any(|(_, d)| *d == data) {
                pool.push((len, data));
            }
        }
        pool.sort_by(|a, b| a.1.cmp(&b.1));

        let mut type_idx: Vec<u32> = self
            .classes
            .iter()
            .filter_map(|c| {
                let data = encode_mutf8(c);
                pool.iter().position(|(_, d)| *d == data).map(|i| i as u32)
            })
            .collect();
        type_idx.sort_unstable();
        type_idx.dedup();

        let string_ids_off = HEADER;
        let type_ids_off = string_ids_off + 4 * pool.len() as u32;
        let class_defs_off = type_ids_off + 4 * type_idx.len() as u32;
        let data_off = class_defs_off + 32 * type_idx.len() as u32;

        let mut data = Vec::new();
        let mut string_offsets = Vec::with_capacity(pool.len());
        for (len, bytes) in &pool {
            string_offsets.push(data_off + data.len() as u32);
            let mut len = *len;
            loop {
                let byte = (len & 0x7f) as u8;
                len >>= 7;
                if len == 0 {
                    data.push(byte);
                    break;
                }
                data.push(byte | 0x80);
            }
            data.extend_from_slice(bytes);
            data.push(0);
        }
        pad4(&mut data);

        let map_off = data_off + data.len() as u32;
        let mut map = vec![(TYPE_HEADER_ITEM, 1, 0)];
        if !pool.is_empty() {
            map.push((TYPE_STRING_ID_ITEM, pool.len() as u32, string_ids_off));
        }
        if !type_idx.is_empty() {
            map.push((TYPE_TYPE_ID_ITEM, type_idx.len() as u32, type_ids_off));
            map.push((TYPE_CLASS_DEF_ITEM, type_idx.len() as u32, class_defs_off));
        }
        if !pool.is_empty() {
            map.push((TYPE_STRING_DATA_ITEM, pool.len() as u32, data_off));
        }
        map.push((TYPE_MAP_LIST, 1, map_off));
        put_u32(&mut data, map.len() as u32);
        for (item_type, size, offset) in map {
            put_u16(&mut data, item_type);
            put_u16(&mut data, 0);
            put_u32(&mut data, size);
            put_u32(&mut data, offset);
        }
        let file_size = data_off + data.len() as u32;

        let mut out = Vec::with_capacity(file_size as usize);
        out.extend_from_slice(b"dex\n035\0");
        put_u32(&mut out, 0); // checksum, filled in below
        out.extend_from_slice(&[0u8; 20]); // signature
        put_u32(&mut out, file_size);
        put_u32(&mut out, HEADER);
        put_u32(&mut out, 0x1234_5678);
        put_u32(&mut out, 0); // link_size
        put_u32(&mut out, 0); // link_off
        put_u32(&mut out, map_off);
        put_u32(&mut out, pool.len() as u32);
        put_u32(&mut out, if pool.is_empty() { 0 } else { string_ids_off });
        put_u32(&mut out, type_idx.len() as u32);
        put_u32(&mut out, if type_idx.is_empty() { 0 } else { type_ids_off });
        for _ in 0..6 {
            put_u32(&mut out, 0); // proto, field, method ids
        }
        put_u32(&mut out, type_idx.len() as u32);
        put_u32(&mut out, if type_idx.is_empty() { 0 } else { class_defs_off });
        put_u32(&mut out, data.len() as u32);
        put_u32(&mut out, data_off);

        for off in string_offsets {
            put_u32(&mut out, off);
        }
        for idx in &type_idx {
            put_u32(&mut out, *idx);
        }
        for i in 0..type_idx.len() {
            put_u32(&mut out, i as u32); // class_idx
            put_u32(&mut out, 0x1); // access_flags
            put_u32(&mut out, NO_ENTRY); // superclass_idx
            put_u32(&mut out, 0); // interfaces_off
            put_u32(&mut out, NO_ENTRY); // source_file_idx
            put_u32(&mut out, 0); // annotations_off
            put_u32(&mut out, 0); // class_data_off
            put_u32(&mut out, 0); // static_values_off
        }
        out.extend(data);

        let checksum = adler32(&out[12..]);
        out[8..12].copy_from_slice(&checksum.to_le_bytes());
        out
    }
}

fn adler32(bytes: &[u8]) -> u32 {
    const MOD: u32 = 65_521;
    let (mut a, mut b) = (1u32, 0u32);
    for &byte in bytes {
        a = (a + u32::from(byte)) % MOD;
        b = (b + a) % MOD;
    }
    (b << 16) | a
}

/// Encode text as DEX modified UTF-8.
pub fn encode_mutf8(s: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for unit in s.encode_utf16() {
        let u = u32::from(unit);
        match u {
            0x01..=0x7f => out.push(u as u8),
            0x00 | 0x80..=0x7ff => {
                out.push(0xc0 | (u >> 6) as u8);
                out.push(0x80 | (u & 0x3f) as u8);
            }
            _ => {
                out.push(0xe0 | (u >> 12) as u8);
                out.push(0x80 | ((u >> 6) & 0x3f) as u8);
                out.push(0x80 | (u & 0x3f) as u8);
            }
        }
    }
    out
}

/// Assembles an APK-shaped zip archive.
#[derive(Default)]
pub struct ApkBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

impl ApkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `AndroidManifest.xml`
    pub fn manifest(self, bytes: Vec<u8>) -> Self {
        self.file("AndroidManifest.xml", bytes)
    }

    /// Add an arbitrary entry
    pub fn file(mut self, name: &str, bytes: Vec<u8>) -> Self {
        self.entries.push((name.to_string(), bytes));
        self
    }

    /// Serialize as a zip archive
    pub fn build(&self) -> zip::result::ZipResult<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, bytes) in &self.entries {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(bytes)?;
        }
        Ok(zip.finish()?.into_inner())
    }

    /// Serialize into `path`
    pub fn write_to(&self, path: &std::path::Path) -> zip::result::ZipResult<()> {
        std::fs::write(path, self.build()?)?;
        Ok(())
    }
}
