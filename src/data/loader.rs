use bevy::asset::{io::Reader, ron, Asset, AssetLoader, LoadContext};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::marker::PhantomData;
use thiserror::Error;

/// 通用 RON 数据表加载器，靠扩展名区分资产类型
pub struct RonAssetLoader<A> {
    extensions: &'static [&'static str],
    _marker: PhantomData<fn() -> A>,
}

impl<A> RonAssetLoader<A> {
    pub fn new(extensions: &'static [&'static str]) -> Self {
        Self {
            extensions,
            _marker: PhantomData,
        }
    }
}

#[derive(Debug, Error)]
pub enum RonAssetLoaderError {
    #[error("Could not load asset: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not parse RON: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("Could not interpret bytes as UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// 字节 → 数据表；loader 和测试共用
pub fn parse_ron<A: DeserializeOwned>(bytes: &[u8]) -> Result<A, RonAssetLoaderError> {
    let s = std::str::from_utf8(bytes)?;
    Ok(ron::de::from_str(s)?)
}

impl<A> AssetLoader for RonAssetLoader<A>
where
    A: Asset + DeserializeOwned,
{
    type Asset = A;
    type Settings = ();
    type Error = RonAssetLoaderError;

    fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext,
    ) -> impl Future<Output = Result<Self::Asset, Self::Error>> + Send {
        async move {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes).await?;
            parse_ron(&bytes)
        }
    }

    fn extensions(&self) -> &[&str] {
        self.extensions
    }
}
