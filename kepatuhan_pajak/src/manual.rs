/*!

This is the long-form manual for `kepatuhan_pajak` and the `kepatuhan` command.

## Input format

One sheet of a spreadsheet (`.xlsx`) or a CSV file. The first row holds the
headers, each following row describes one taxable object (objek pajak).

Required columns, under any of their usual spellings:

| canonical name | accepted headers (case, dots and underscores ignored) |
|----------------|--------------------------------------------------------|
| `TMT`          | `TMT`, `T.M.T`, `Tgl Mulai`                             |
| `STATUS`       | `Status`                                               |
| `KLASIFIKASI`  | `Klasifikasi`, `Kategori`, `Jenis`, `Klasifikasi Hiburan` |
| `Nm Unit`      | `Nm Unit`, `NM_UNIT`, `Unit`                           |

Optional columns: `Nama Op` (needed for the ranking of the objects) and
`Nama WP` (`WP`, `Wajib Pajak`, `Nama WP`).

If several headers map to the same name, the leftmost one gets it and the
others keep their header. A later header spelled exactly like the name it
lost gets a suffix: with the headers `Unit` and `Nm Unit`, the first becomes
`Nm Unit` and the second `Nm Unit.1`.

Payment columns are recognized by their header, which must name a month:
`Jan-24`, `Jan-2024`, `January 2024`, `01/2024`, `2024-01`, or a full date such
as `2024-01-01` (the day is ignored). Month names can be short (`Jan`) or
full (`January`, `March-24`). Date-formatted header cells of a spreadsheet
work too. A year alone (`2024`) is not a month. Any other header is kept as a
descriptive column.

## Computation

For the tax year `Y` and each object:

* `bulan_aktif`: 12 if the object started (`TMT`) before `Y`, 0 if it starts
  after `Y` or if its `TMT` cannot be read, and `12 - month + 1` if it
  starts during `Y`.
* `bulan_pembayaran`: the number of payment columns of `Y` with a positive amount.
* `Total Pembayaran`: the sum of the payments of `Y`. Empty or non-numeric
  cells count as zero.
* `Rata-rata Pembayaran`: the total divided by the number of paid months (by 1
  if nothing was paid).
* `Kepatuhan (%)`: paid months divided by active months (by 1 if the object was
  not active), times 100.
* `Klasifikasi Kepatuhan`, the first matching rule:
  1. `Belum Aktif`: no active month and no payment,
  2. `Patuh`: as many paid months as active months,
  3. `Kurang Patuh`: at most 3 unpaid active months,
  4. `Tidak Patuh` otherwise.

An object that paid without being active (for example with a `TMT` in the
following year) is `Kurang Patuh`: its shortfall is negative. Its
`Kepatuhan (%)` is then the number of paid months times 100.

## Filters

The units (`Nm Unit`), categories (`KLASIFIKASI`) and status (`STATUS`) can be
filtered by exact value. The value `Semua` means no filter.

*/
