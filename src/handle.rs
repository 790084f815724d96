use std::io::Cursor;

use anyhow::Result;
use rabex::files::SerializedFile;
use rabex::files::serializedfile::ObjectRef;
use rabex::objects::pptr::PathId;
use rabex::objects::ClassIdType;
use rabex::tpk::TpkTypeTreeBlob;
use rabex::typetree::TypeTreeProvider;
use rabex::typetree::typetree_cache::sync::TypeTreeCache;
use serde::Deserialize;

/// A parsed serialized file together with its bytes and the type tree provider
/// used for objects without an embedded type tree.
pub struct SerializedFileHandle<'a, P = TypeTreeCache<TpkTypeTreeBlob>> {
    pub file: &'a SerializedFile,
    pub data: &'a [u8],
    pub tpk: &'a P,
}
pub struct ObjectRefHandle<'a, T, P = TypeTreeCache<TpkTypeTreeBlob>> {
    pub object: ObjectRef<'a, T>,
    pub file: SerializedFileHandle<'a, P>,
}

impl<'a, T, P> std::fmt::Debug for ObjectRefHandle<'a, T, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectRefHandle")
            .field("object", &self.object.info)
            .finish()
    }
}
impl<'a, P> SerializedFileHandle<'a, P> {
    pub fn reborrow(&self) -> SerializedFileHandle<'a, P> {
        SerializedFileHandle {
            file: self.file,
            data: self.data,
            tpk: self.tpk,
        }
    }

    pub fn new(file: &'a SerializedFile, data: &'a [u8], tpk: &'a P) -> Self {
        SerializedFileHandle { file, data, tpk }
    }

    pub fn reader(&self) -> Cursor<&'a [u8]> {
        Cursor::new(self.data)
    }
}

impl<'a, P: TypeTreeProvider> SerializedFileHandle<'a, P> {
    pub fn objects_of<T>(&self) -> impl Iterator<Item = ObjectRefHandle<'a, T, P>>
    where
        T: ClassIdType,
    {
        let iter = self.file.objects_of::<T>(self.tpk);
        iter.map(|o| ObjectRefHandle::new(o, self.reborrow()))
    }
}

impl<'a, T, P: TypeTreeProvider> ObjectRefHandle<'a, T, P> {
    pub fn new(object: ObjectRef<'a, T>, file: SerializedFileHandle<'a, P>) -> Self {
        ObjectRefHandle { object, file }
    }

    /// Decodes the object with its type tree.
    pub fn read(&self) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let data = self.object.read(&mut self.file.reader())?;
        Ok(data)
    }

    pub fn cast_owned<U>(self) -> ObjectRefHandle<'a, U, P> {
        ObjectRefHandle {
            object: self.object.cast_owned(),
            file: self.file.reborrow(),
        }
    }
}

impl<'a, T, P> ObjectRefHandle<'a, T, P> {
    pub fn path_id(&self) -> PathId {
        self.object.info.m_PathID
    }
}
