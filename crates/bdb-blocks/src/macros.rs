/// Implement `Encode`, `Decode` and `TreeHash` for a plain container struct.
///
/// Fields are listed in declaration order, which is also wire order and
/// tree-hash leaf order. A list field may carry `[max = N]`; decoding then
/// rejects more than `N` elements before decoding any of them.
macro_rules! impl_container {
    (@decode $decoder:ident, $field:ident) => {
        $decoder.decode_next()?
    };
    (@decode $decoder:ident, $field:ident, $max:expr) => {
        $decoder.decode_list_next(stringify!($field), $max)?
    };
    ($name:ident { $($field:ident: $ty:ty $([max = $max:expr])?),+ $(,)? }) => {
        impl bdb_codec::Encode for $name {
            fn is_fixed_len() -> bool {
                true $(&& <$ty as bdb_codec::Encode>::is_fixed_len())+
            }

            fn fixed_len() -> usize {
                0 $(+ bdb_codec::fixed_part_len::<$ty>())+
            }

            fn encoded_len(&self) -> usize {
                let mut len = 0;
                $(
                    len += bdb_codec::fixed_part_len::<$ty>();
                    if !<$ty as bdb_codec::Encode>::is_fixed_len() {
                        len += bdb_codec::Encode::encoded_len(&self.$field);
                    }
                )+
                len
            }

            fn encode_into(&self, buf: &mut Vec<u8>) {
                let fixed = 0 $(+ bdb_codec::fixed_part_len::<$ty>())+;
                let mut encoder = bdb_codec::ContainerEncoder::new(buf, fixed);
                $(encoder.append(&self.$field);)+
                encoder.finalize();
            }
        }

        impl bdb_codec::Decode for $name {
            fn is_fixed_len() -> bool {
                true $(&& <$ty as bdb_codec::Decode>::is_fixed_len())+
            }

            fn fixed_len() -> usize {
                <Self as bdb_codec::Encode>::fixed_len()
            }

            fn decode(bytes: &[u8]) -> Result<Self, bdb_codec::DecodeError> {
                let mut builder = bdb_codec::ContainerDecoderBuilder::new(bytes);
                $(builder.register::<$ty>()?;)+
                let mut decoder = builder.build()?;
                Ok(Self {
                    $($field: impl_container!(@decode decoder, $field $(, $max)?),)+
                })
            }
        }

        impl bdb_crypto::TreeHash for $name {
            fn tree_hash_root(&self) -> bdb_types::Root {
                bdb_crypto::hash_fields(&[
                    $(bdb_crypto::TreeHash::tree_hash_root(&self.$field)),+
                ])
            }
        }
    };
}
