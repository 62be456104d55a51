/// Define an [`Adapter`](crate::map::Adapter) for a record type that embeds a
/// node in one of its fields.
///
/// The comparators may be paths to functions or non-capturing closures.
///
/// ```
/// use core::cmp::Ordering;
/// use rbnest::{compact::CompactNode, rb_map, Adapter};
///
/// pub struct Page {
///     pub addr: usize,
///     pub link: CompactNode,
/// }
///
/// rb_map! {
///     /// Pages ordered by address
///     pub struct ByAddr for Page {
///         key: usize,
///         node: CompactNode = link,
///         cmp_key: |addr, page| addr.cmp(&page.addr),
///         cmp: |a, b| a.addr.cmp(&b.addr),
///     }
/// }
///
/// let page = Page { addr: 0x1000, link: CompactNode::new() };
/// assert_eq!(ByAddr::cmp_key(&0x2000, &page), Ordering::Greater);
/// ```
#[macro_export]
macro_rules! rb_map {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident for $record:ty {
            key: $key:ty,
            node: $link:ty = $field:ident,
            cmp_key: $cmp_key:expr,
            cmp: $cmp:expr $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        $vis struct $name;

        unsafe impl $crate::map::Adapter for $name {
            type Key = $key;
            type Record = $record;
            type Link = $link;

            #[inline]
            unsafe fn link(
                record: ::core::ptr::NonNull<$record>,
            ) -> ::core::ptr::NonNull<$link> {
                unsafe {
                    ::core::ptr::NonNull::new_unchecked(::core::ptr::addr_of_mut!(
                        (*record.as_ptr()).$field
                    ))
                }
            }

            #[inline]
            unsafe fn record(
                link: ::core::ptr::NonNull<$link>,
            ) -> ::core::ptr::NonNull<$record> {
                unsafe {
                    ::core::ptr::NonNull::new_unchecked(
                        link.as_ptr()
                            .cast::<u8>()
                            .sub(::core::mem::offset_of!($record, $field))
                            .cast::<$record>(),
                    )
                }
            }

            #[inline]
            fn cmp_key(key: &$key, record: &$record) -> ::core::cmp::Ordering {
                let cmp: fn(&$key, &$record) -> ::core::cmp::Ordering = $cmp_key;
                cmp(key, record)
            }

            #[inline]
            fn cmp_records(a: &$record, b: &$record) -> ::core::cmp::Ordering {
                let cmp: fn(&$record, &$record) -> ::core::cmp::Ordering = $cmp;
                cmp(a, b)
            }
        }
    };
}
