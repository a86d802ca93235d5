// Structural page copy: pages and everything they reference, renumbered into
// another document.

use std::collections::{HashMap, HashSet};

use lopdf::{Dictionary, Document, Object, ObjectId};

/// Page attributes that may be inherited from ancestor page-tree nodes.
const INHERITABLE_ATTRIBUTES: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// 入力PDFのオブジェクトを出力PDFへコピーする。
///
/// 同じ入力オブジェクトは一度だけコピーされ、以降の参照はコピー先のIDに張り替えられる。
pub struct ObjectCopier<'a> {
    source: &'a Document,
    id_map: HashMap<ObjectId, ObjectId>,
    pending: Vec<(ObjectId, ObjectId)>,
}

impl<'a> ObjectCopier<'a> {
    pub fn new(source: &'a Document) -> Self {
        Self {
            source,
            id_map: HashMap::new(),
            pending: Vec::new(),
        }
    }

    /// 入力オブジェクトに対応する出力IDを予約する（内容はコピーしない）。
    ///
    /// ページを事前に予約しておくと、他ページへの参照（リンク先、/P など）が
    /// そのページのコピーを指すようになる。
    pub fn reserve(&mut self, target: &mut Document, source_id: ObjectId) -> ObjectId {
        *self
            .id_map
            .entry(source_id)
            .or_insert_with(|| target.new_object_id())
    }

    /// 1ページをコピーし、出力ページのIDを返す。
    ///
    /// 継承属性はページ辞書に取り込み、/Parent は `parent` に付け替える。
    pub fn copy_page(
        &mut self,
        target: &mut Document,
        page_id: ObjectId,
        parent: ObjectId,
    ) -> crate::error::Result<ObjectId> {
        let mut page = self.source.get_dictionary(page_id)?.clone();
        // 自己参照（注釈の /P など）が汎用コピーに回らないよう先に予約する
        let new_id = self.reserve(target, page_id);

        for key in INHERITABLE_ATTRIBUTES {
            if !page.has(key) {
                if let Some(value) = inherited_attribute(self.source, &page, key) {
                    page.set(key.to_vec(), value);
                }
            }
        }
        page.remove(b"Parent");

        let mut page = Object::Dictionary(page);
        self.remap(target, &mut page);
        if let Object::Dictionary(dict) = &mut page {
            dict.set("Parent", Object::Reference(parent));
        }

        target.objects.insert(new_id, page);
        self.drain(target);
        Ok(new_id)
    }

    pub fn into_id_map(self) -> HashMap<ObjectId, ObjectId> {
        self.id_map
    }

    fn map_reference(&mut self, target: &mut Document, source_id: ObjectId) -> ObjectId {
        if let Some(&id) = self.id_map.get(&source_id) {
            return id;
        }
        let id = target.new_object_id();
        self.id_map.insert(source_id, id);
        self.pending.push((source_id, id));
        id
    }

    fn remap(&mut self, target: &mut Document, obj: &mut Object) {
        match obj {
            Object::Reference(id) => *id = self.map_reference(target, *id),
            Object::Array(items) => {
                for item in items.iter_mut() {
                    self.remap(target, item);
                }
            }
            Object::Dictionary(dict) => self.remap_dict(target, dict),
            Object::Stream(stream) => self.remap_dict(target, &mut stream.dict),
            _ => {}
        }
    }

    fn remap_dict(&mut self, target: &mut Document, dict: &mut Dictionary) {
        for (_, value) in dict.iter_mut() {
            self.remap(target, value);
        }
    }

    // Worklist instead of recursion: reference chains can be arbitrarily long.
    fn drain(&mut self, target: &mut Document) {
        while let Some((source_id, new_id)) = self.pending.pop() {
            let mut obj = match self.source.get_object(source_id) {
                Ok(obj) => obj.clone(),
                Err(_) => {
                    tracing::debug!(object = ?source_id, "dangling reference copied as null");
                    Object::Null
                }
            };
            self.remap(target, &mut obj);
            target.objects.insert(new_id, obj);
        }
    }
}

/// ページツリーを親方向にたどって継承属性を探す。
fn inherited_attribute(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut visited = HashSet::new();
    let mut parent = page.get(b"Parent").ok()?.as_reference().ok()?;

    while visited.insert(parent) {
        let node = doc.get_dictionary(parent).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").ok()?.as_reference().ok()?;
    }
    None
}
